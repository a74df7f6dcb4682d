// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Readiness gate only

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use survival_agent_core::application::{ReadinessError, ReadinessGate};
use survival_agent_core::infrastructure::CommandInvoker;

pub async fn handle_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let engine = &config.spec.engine;

    println!("Checking device readiness ({} {})...", engine.binary, engine.ping_args.join(" "));

    let invoker = Arc::new(CommandInvoker::new(&engine.binary));
    if let Err(e) = ReadinessGate::from_config(invoker, engine).check().await {
        if let ReadinessError::NotReady { output } = &e {
            for line in probe_output_lines(output) {
                eprintln!("{}", line);
            }
        }
        return Err(e.into());
    }

    println!("{}", "✓ Device ready".green());
    Ok(())
}

/// Probe output framed for the console
pub(crate) fn probe_output_lines(output: &str) -> Vec<String> {
    let body = output.trim();
    if body.is_empty() {
        return vec![format!("{}", "Probe produced no output".dimmed())];
    }

    std::iter::once(format!("{}", "Probe output:".bold()))
        .chain(body.lines().map(|line| format!("  {}", line)))
        .collect()
}
