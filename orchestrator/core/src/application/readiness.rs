// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Readiness Gate
//!
//! Runs the automation engine's health-check subcommand and passes only if
//! the combined output contains the configured ready signal. A failed gate
//! is never retried.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements the device readiness precondition

use crate::domain::agent_config::EngineConfig;
use crate::domain::process::{Invocation, OutputMode, ProcessError, ProcessInvoker};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Device not ready: readiness signal missing from probe output")]
    NotReady { output: String },

    #[error("Readiness probe could not run: {0}")]
    Probe(#[from] ProcessError),
}

pub struct ReadinessGate {
    invoker: Arc<dyn ProcessInvoker>,
    args: Vec<String>,
    ready_signal: String,
    env: BTreeMap<String, String>,
    timeout: Duration,
}

impl ReadinessGate {
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        args: Vec<String>,
        ready_signal: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            invoker,
            args,
            ready_signal: ready_signal.into(),
            env: BTreeMap::new(),
            timeout,
        }
    }

    pub fn from_config(invoker: Arc<dyn ProcessInvoker>, engine: &EngineConfig) -> Self {
        let mut gate = Self::new(
            invoker,
            engine.ping_args.clone(),
            engine.ready_signal.clone(),
            engine.probe_timeout(),
        );
        gate.env = engine.env.clone();
        gate
    }

    /// Blocking probe; returns the captured output on success.
    pub async fn check(&self) -> Result<String, ReadinessError> {
        info!("Checking automation engine readiness");

        let mut invocation =
            Invocation::new(self.args.clone(), self.timeout).with_output(OutputMode::Capture);
        invocation.env = self.env.clone();

        let output = self.invoker.invoke(invocation).await?;
        let combined = output.combined();
        debug!(status = ?output.status, "Probe output:\n{}", combined);

        if combined.contains(&self.ready_signal) {
            info!("Automation engine is ready");
            Ok(combined)
        } else {
            warn!("Readiness signal not found in probe output");
            Err(ReadinessError::NotReady { output: combined })
        }
    }
}
