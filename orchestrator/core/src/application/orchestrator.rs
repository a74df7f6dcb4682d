// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Credential Rotation Orchestrator
//!
//! Drives one command from raw text to an armed device:
//!
//! ```text
//! GATE ──► INTERPRET ──► EXECUTE(0) ──► EXECUTE(1) ──► ... ──► DONE
//!   │          │              │
//!   └──────────┴──────────────┴──────────► FAILED
//! ```
//!
//! - **GATE** runs the readiness probe. Failure is final.
//! - The credential list is loaded next; missing or empty is final.
//! - **INTERPRET** runs once, charged to the first credential only.
//!   A validation failure is final; interpretation is never rotated.
//! - **EXECUTE(i)** invokes the automation engine with credential `i`
//!   injected into that child's environment only. Non-zero exit, spawn
//!   failure or timeout advances to `i + 1` after a fixed pause.
//! - Running out of credentials is final.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements gated, credential-rotating execution

use crate::application::interpreter::{IntentInterpreter, InterpretationOutput};
use crate::application::name_resolver::FallbackNameResolver;
use crate::application::readiness::{ReadinessError, ReadinessGate};
use crate::domain::agent_config::{AgentConfigSpec, EngineConfig};
use crate::domain::credentials::{Credential, CredentialError, CredentialSet};
use crate::domain::goal::{CompiledGoal, GoalError};
use crate::domain::llm::{GenerationOptions, LLMProviderFactory};
use crate::domain::process::{Invocation, OutputMode, ProcessInvoker};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] CredentialError),

    #[error("Interpretation failed: {0}")]
    Interpretation(#[from] GoalError),

    #[error("All API keys exhausted after {} attempt(s)", .attempts.len())]
    Exhausted { attempts: Vec<AttemptRecord> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Gate,
    Interpret,
    /// Zero-based credential index
    Execute(usize),
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    /// Engine ran and exited non-zero (`None` = killed by signal)
    ExitedWith(Option<i32>),
    /// Engine could not be run or did not finish in time
    Errored(String),
}

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// One-based position of the credential in the list
    pub key_number: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub interpretation: InterpretationOutput,
    pub attempts: Vec<AttemptRecord>,
}

impl RunReport {
    /// One-based number of the credential that succeeded
    pub fn succeeded_with(&self) -> Option<usize> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Succeeded)
            .map(|a| a.key_number)
    }
}

pub struct CredentialRotationOrchestrator {
    gate: ReadinessGate,
    invoker: Arc<dyn ProcessInvoker>,
    providers: Arc<dyn LLMProviderFactory>,
    engine: EngineConfig,
    generation: GenerationOptions,
    llm_timeout: Duration,
    /// Variable the engine reads its credential from
    credential_env: String,
    /// Variable the rotation list came from, for error messages
    rotation_env: String,
}

impl CredentialRotationOrchestrator {
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        providers: Arc<dyn LLMProviderFactory>,
        spec: &AgentConfigSpec,
    ) -> Self {
        Self {
            gate: ReadinessGate::from_config(invoker.clone(), &spec.engine),
            invoker,
            providers,
            engine: spec.engine.clone(),
            generation: GenerationOptions {
                max_tokens: Some(spec.llm.max_tokens),
                temperature: Some(spec.llm.temperature),
                json_response: true,
            },
            llm_timeout: spec.llm.timeout(),
            credential_env: spec.credentials.credential_env.clone(),
            rotation_env: spec.credentials.rotation_env.clone(),
        }
    }

    /// Run one command end to end. `raw_credentials` is the comma-separated
    /// rotation list as read from configuration.
    pub async fn run(
        &self,
        text: &str,
        raw_credentials: Option<&str>,
    ) -> Result<RunReport, OrchestratorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_inner(run_id, text, raw_credentials)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        text: &str,
        raw_credentials: Option<&str>,
    ) -> Result<RunReport, OrchestratorError> {
        let mut state = RunState::Gate;
        debug!(?state, "Starting run");

        if let Err(e) = self.gate.check().await {
            transition(&mut state, RunState::Failed);
            error!("Readiness gate failed: {}", e);
            return Err(e.into());
        }

        let credentials = match CredentialSet::parse(raw_credentials, &self.rotation_env) {
            Ok(set) => set,
            Err(e) => {
                transition(&mut state, RunState::Failed);
                error!("{}", e);
                return Err(e.into());
            }
        };
        info!(keys = credentials.len(), "Loaded credential list");

        transition(&mut state, RunState::Interpret);
        let interpretation = match self.interpret(text, credentials.first()).await {
            Ok(output) => output,
            Err(e) => {
                transition(&mut state, RunState::Failed);
                error!("Interpretation failed: {}", e);
                return Err(e.into());
            }
        };

        let goal = &interpretation.droidrun_goal;
        let mut attempts = Vec::with_capacity(credentials.len());

        for (index, credential) in credentials.iter().enumerate() {
            transition(&mut state, RunState::Execute(index));
            let key_number = index + 1;
            info!("Trying API key #{}", key_number);

            let record = self.execute(goal, credential, key_number).await;
            let succeeded = record.outcome == AttemptOutcome::Succeeded;
            attempts.push(record);

            if succeeded {
                transition(&mut state, RunState::Done);
                info!("Execution succeeded with API key #{}", key_number);
                return Ok(RunReport {
                    run_id,
                    interpretation,
                    attempts,
                });
            }

            if key_number < credentials.len() {
                warn!("Run failed, trying next key");
                tokio::time::sleep(self.engine.retry_pause()).await;
            }
        }

        transition(&mut state, RunState::Failed);
        error!("All API keys exhausted");
        Err(OrchestratorError::Exhausted { attempts })
    }

    /// Interpretation stage, charged to `credential`
    pub async fn interpret(
        &self,
        text: &str,
        credential: &Credential,
    ) -> Result<InterpretationOutput, GoalError> {
        let resolver = match self.providers.for_credential(credential) {
            Ok(provider) => {
                FallbackNameResolver::new(provider, self.generation.clone(), self.llm_timeout)
            }
            Err(e) => {
                warn!("Fallback name resolver unavailable: {}", e);
                FallbackNameResolver::disabled()
            }
        };

        IntentInterpreter::new(resolver)
            .interpret_and_compile(text)
            .await
    }

    /// Engine arguments for one execution attempt
    pub fn execution_args(&self, goal: &CompiledGoal) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            goal.text(),
            "--provider".to_string(),
            self.engine.provider.clone(),
            "--model".to_string(),
            self.engine.model.clone(),
        ];
        if self.engine.vision {
            args.push("--vision".to_string());
        }
        args.push("--steps".to_string());
        args.push(self.engine.max_steps.to_string());
        args
    }

    async fn execute(
        &self,
        goal: &CompiledGoal,
        credential: &Credential,
        key_number: usize,
    ) -> AttemptRecord {
        info!("Running automation goal:\n{}", goal);

        let mut invocation = Invocation::new(self.execution_args(goal), self.engine.execution_timeout())
            .with_output(OutputMode::Inherit);
        invocation.env = self.engine.env.clone();
        invocation
            .env
            .insert(self.credential_env.clone(), credential.expose().to_string());

        let started_at = Utc::now();
        let outcome = match self.invoker.invoke(invocation).await {
            Ok(output) if output.success() => AttemptOutcome::Succeeded,
            Ok(output) => {
                warn!(status = ?output.status, "Automation engine exited unsuccessfully");
                AttemptOutcome::ExitedWith(output.status)
            }
            Err(e) => {
                warn!("Automation engine attempt failed: {}", e);
                AttemptOutcome::Errored(e.to_string())
            }
        };

        AttemptRecord {
            key_number,
            started_at,
            ended_at: Utc::now(),
            outcome,
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = ?*state, to = ?next, "State transition");
    *state = next;
}
