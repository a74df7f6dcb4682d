// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Full run: readiness gate, one interpretation, execution with API key
//! rotation.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use survival_agent_core::application::orchestrator::{
    AttemptOutcome, AttemptRecord, OrchestratorError, RunReport,
};
use survival_agent_core::application::{CredentialRotationOrchestrator, ReadinessError};
use survival_agent_core::infrastructure::llm::ProviderRegistry;
use survival_agent_core::infrastructure::CommandInvoker;

pub async fn handle_command(text: &str, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let spec = &config.spec;

    let invoker = Arc::new(CommandInvoker::new(&spec.engine.binary));
    let providers = Arc::new(ProviderRegistry::from_config(&spec.llm)?);
    let orchestrator = CredentialRotationOrchestrator::new(invoker, providers, spec);

    println!("{} {}", "Command:".bold(), text);

    let report = match orchestrator
        .run(text, spec.credentials.rotation_list().as_deref())
        .await
    {
        Ok(report) => report,
        Err(e) => {
            for line in failure_details(&e) {
                eprintln!("{}", line);
            }
            return Err(e.into());
        }
    };

    print_report(&report);
    Ok(())
}

/// Context printed ahead of the final error: the probe output when the
/// device is not ready, every key's outcome when all keys failed.
fn failure_details(err: &OrchestratorError) -> Vec<String> {
    match err {
        OrchestratorError::Readiness(ReadinessError::NotReady { output }) => {
            super::ping::probe_output_lines(output)
        }
        OrchestratorError::Exhausted { attempts } => attempts.iter().map(attempt_line).collect(),
        _ => Vec::new(),
    }
}

fn attempt_line(attempt: &AttemptRecord) -> String {
    let elapsed = attempt.ended_at - attempt.started_at;
    format!(
        "  Key #{}: {} ({}s)",
        attempt.key_number,
        describe(&attempt.outcome),
        elapsed.num_seconds()
    )
}

fn print_report(report: &RunReport) {
    let intent = &report.interpretation.interpreted_intent;
    println!();
    println!("{}", "Interpreted intent:".bold());
    println!("  Trusted person: {}", intent.trusted_person);
    println!("  Activation code: {}", intent.activation_code);
    println!("  Situation: {}", intent.situation_intent.as_str());
    println!();

    for attempt in &report.attempts {
        let line = attempt_line(attempt);
        if attempt.outcome == AttemptOutcome::Succeeded {
            println!("{}", line.green());
        } else {
            println!("{}", line.yellow());
        }
    }

    if let Some(key_number) = report.succeeded_with() {
        println!();
        println!(
            "{}",
            format!("✓ Survival Agent armed (API key #{})", key_number).green().bold()
        );
        println!("  Run ID: {}", report.run_id);
    }
}

fn describe(outcome: &AttemptOutcome) -> String {
    match outcome {
        AttemptOutcome::Succeeded => "succeeded".to_string(),
        AttemptOutcome::ExitedWith(Some(code)) => format!("exited with status {}", code),
        AttemptOutcome::ExitedWith(None) => "terminated by signal".to_string(),
        AttemptOutcome::Errored(reason) => reason.clone(),
    }
}
