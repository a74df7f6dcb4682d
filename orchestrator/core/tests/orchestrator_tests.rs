// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use survival_agent_core::application::orchestrator::{
    AttemptOutcome, CredentialRotationOrchestrator, OrchestratorError,
};
use survival_agent_core::application::readiness::ReadinessError;
use survival_agent_core::domain::agent_config::AgentConfigSpec;
use survival_agent_core::domain::credentials::{Credential, CredentialError};
use survival_agent_core::domain::goal::GoalError;
use survival_agent_core::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, LLMProvider, LLMProviderFactory,
    TokenUsage,
};
use survival_agent_core::domain::process::{
    Invocation, OutputMode, ProcessError, ProcessInvoker, ProcessOutput,
};

/// Stands in for the automation engine. `ping` answers with the scripted
/// probe output; `run` succeeds only for the listed credentials.
struct MockEngine {
    probe_output: String,
    succeed_for: Vec<&'static str>,
    runs: Mutex<Vec<Invocation>>,
    pings: AtomicUsize,
}

impl MockEngine {
    fn ready(succeed_for: Vec<&'static str>) -> Self {
        Self {
            probe_output: "Connected to device\nYou're good to go!".to_string(),
            succeed_for,
            runs: Mutex::new(Vec::new()),
            pings: AtomicUsize::new(0),
        }
    }

    fn not_ready() -> Self {
        Self {
            probe_output: "No connected devices found".to_string(),
            ..Self::ready(vec![])
        }
    }

    fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    fn keys_used(&self) -> Vec<String> {
        self.runs
            .lock()
            .unwrap()
            .iter()
            .map(|inv| inv.env.get("GOOGLE_API_KEY").cloned().unwrap_or_default())
            .collect()
    }
}

#[async_trait]
impl ProcessInvoker for MockEngine {
    async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutput, ProcessError> {
        if invocation.args.first().map(String::as_str) == Some("ping") {
            self.pings.fetch_add(1, Ordering::SeqCst);
            return Ok(ProcessOutput {
                status: Some(0),
                stdout: self.probe_output.clone(),
                stderr: String::new(),
            });
        }

        let key = invocation.env.get("GOOGLE_API_KEY").cloned().unwrap_or_default();
        self.runs.lock().unwrap().push(invocation);

        let status = if self.succeed_for.iter().any(|k| *k == key) { 0 } else { 1 };
        Ok(ProcessOutput {
            status: Some(status),
            ..Default::default()
        })
    }
}

struct MockProvider {
    reply: &'static str,
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        Ok(GenerationResponse {
            text: self.reply.to_string(),
            usage: TokenUsage::default(),
            model: "mock".to_string(),
            finish_reason: FinishReason::Stop,
        })
    }
}

/// Records which credentials interpretation was charged to.
struct MockFactory {
    reply: &'static str,
    bound: Mutex<Vec<String>>,
}

impl MockFactory {
    fn replying(reply: &'static str) -> Self {
        Self {
            reply,
            bound: Mutex::new(Vec::new()),
        }
    }
}

impl LLMProviderFactory for MockFactory {
    fn for_credential(&self, credential: &Credential) -> Result<Arc<dyn LLMProvider>, LLMError> {
        self.bound.lock().unwrap().push(credential.expose().to_string());
        Ok(Arc::new(MockProvider { reply: self.reply }))
    }
}

fn spec() -> AgentConfigSpec {
    let mut spec = AgentConfigSpec::default();
    spec.engine.retry_pause_ms = 0;
    spec
}

fn orchestrator(
    engine: &Arc<MockEngine>,
    factory: &Arc<MockFactory>,
) -> CredentialRotationOrchestrator {
    CredentialRotationOrchestrator::new(engine.clone(), factory.clone(), &spec())
}

const HIKING: &str = "set up agent to aryan's number for 2 hours hiking trip";

#[tokio::test]
async fn test_rotation_stops_at_third_key() {
    let engine = Arc::new(MockEngine::ready(vec!["k3"]));
    let factory = Arc::new(MockFactory::replying("{}"));

    let report = orchestrator(&engine, &factory)
        .run(HIKING, Some("k1,k2,k3"))
        .await
        .unwrap();

    assert_eq!(engine.run_count(), 3);
    assert_eq!(engine.keys_used(), vec!["k1", "k2", "k3"]);
    assert_eq!(report.attempts.len(), 3);
    assert_eq!(report.succeeded_with(), Some(3));
    assert_eq!(report.attempts[0].outcome, AttemptOutcome::ExitedWith(Some(1)));
}

#[tokio::test]
async fn test_first_success_stops_rotation() {
    let engine = Arc::new(MockEngine::ready(vec!["k1", "k2"]));
    let factory = Arc::new(MockFactory::replying("{}"));

    let report = orchestrator(&engine, &factory)
        .run(HIKING, Some("k1,k2"))
        .await
        .unwrap();

    assert_eq!(engine.run_count(), 1);
    assert_eq!(report.succeeded_with(), Some(1));
}

#[tokio::test]
async fn test_exhaustion_tries_every_key_once() {
    let engine = Arc::new(MockEngine::ready(vec![]));
    let factory = Arc::new(MockFactory::replying("{}"));

    let err = orchestrator(&engine, &factory)
        .run(HIKING, Some("k1,k2,k3"))
        .await
        .unwrap_err();

    let OrchestratorError::Exhausted { attempts } = &err else {
        panic!("expected exhaustion, got {err:?}");
    };
    assert_eq!(attempts.len(), 3);
    assert_eq!(
        attempts.iter().map(|a| a.key_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(attempts
        .iter()
        .all(|a| a.outcome == AttemptOutcome::ExitedWith(Some(1))));
    assert_eq!(err.to_string(), "All API keys exhausted after 3 attempt(s)");
    assert_eq!(engine.run_count(), 3);
}

#[tokio::test]
async fn test_interpretation_uses_first_key_only_once() {
    let engine = Arc::new(MockEngine::ready(vec!["k3"]));
    let factory = Arc::new(MockFactory::replying(r#"{"trusted_person":"Kabir"}"#));

    let report = orchestrator(&engine, &factory)
        .run("protect me, my phone was stolen", Some("k1,k2,k3"))
        .await
        .unwrap();

    assert_eq!(*factory.bound.lock().unwrap(), vec!["k1".to_string()]);
    assert_eq!(report.interpretation.interpreted_intent.trusted_person, "Kabir");
    assert_eq!(
        report.interpretation.interpreted_intent.activation_code.to_string(),
        "SURVIVAL"
    );
}

#[tokio::test]
async fn test_unready_device_aborts_before_credentials() {
    let engine = Arc::new(MockEngine::not_ready());
    let factory = Arc::new(MockFactory::replying("{}"));

    let err = orchestrator(&engine, &factory)
        .run(HIKING, Some("k1,k2"))
        .await
        .unwrap_err();

    let OrchestratorError::Readiness(ReadinessError::NotReady { output }) = &err else {
        panic!("expected readiness failure, got {err:?}");
    };
    assert_eq!(output, "No connected devices found");
    assert_eq!(engine.pings.load(Ordering::SeqCst), 1);
    assert_eq!(engine.run_count(), 0);
    assert!(factory.bound.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_credentials_is_configuration_error() {
    let engine = Arc::new(MockEngine::ready(vec!["k1"]));
    let factory = Arc::new(MockFactory::replying("{}"));

    let err = orchestrator(&engine, &factory).run(HIKING, None).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Configuration(CredentialError::Missing(_))
    ));

    let err = orchestrator(&engine, &factory)
        .run(HIKING, Some(" , "))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Configuration(CredentialError::Empty(_))
    ));
    assert_eq!(engine.run_count(), 0);
}

#[tokio::test]
async fn test_unresolved_name_aborts_before_execution() {
    let engine = Arc::new(MockEngine::ready(vec!["k1"]));
    let factory = Arc::new(MockFactory::replying(r#"{"trusted_person": ""}"#));

    let err = orchestrator(&engine, &factory)
        .run("protect me, my phone was stolen", Some("k1,k2"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::Interpretation(GoalError::UnresolvedTrustedPerson)
    ));
    assert_eq!(engine.run_count(), 0);
}

#[tokio::test]
async fn test_execution_invocation_shape() {
    let engine = Arc::new(MockEngine::ready(vec!["k1"]));
    let factory = Arc::new(MockFactory::replying("{}"));

    let report = orchestrator(&engine, &factory)
        .run(HIKING, Some("k1"))
        .await
        .unwrap();

    let runs = engine.runs.lock().unwrap();
    let invocation = &runs[0];
    let goal = report.interpretation.droidrun_goal.text();

    assert_eq!(
        invocation.args,
        vec![
            "run".to_string(),
            goal,
            "--provider".to_string(),
            "GoogleGenAI".to_string(),
            "--model".to_string(),
            "gemini-2.5-flash-lite".to_string(),
            "--vision".to_string(),
            "--steps".to_string(),
            "30".to_string(),
        ]
    );
    assert_eq!(invocation.output, OutputMode::Inherit);
    assert_eq!(invocation.env.get("PYTHONUTF8").map(String::as_str), Some("1"));
    assert_eq!(invocation.env.get("GOOGLE_API_KEY").map(String::as_str), Some("k1"));
}

#[tokio::test(start_paused = true)]
async fn test_fixed_pause_between_attempts() {
    let engine = Arc::new(MockEngine::ready(vec!["k3"]));
    let factory = Arc::new(MockFactory::replying("{}"));
    let mut spec = spec();
    spec.engine.retry_pause_ms = 1000;
    let orchestrator = CredentialRotationOrchestrator::new(engine.clone(), factory.clone(), &spec);

    let started = tokio::time::Instant::now();
    orchestrator.run(HIKING, Some("k1,k2,k3")).await.unwrap();

    // Two failures, two equal pauses, no growth
    let elapsed = started.elapsed();
    assert!(elapsed >= std::time::Duration::from_millis(2000));
    assert!(elapsed < std::time::Duration::from_millis(3000));
}
