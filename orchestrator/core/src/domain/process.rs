// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// External automation engine boundary. Every call into the engine goes
// through `ProcessInvoker`, so the orchestrator can be driven by a test
// double instead of a real device.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// How the child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect both streams into `ProcessOutput`
    Capture,
    /// Stream to the parent's console; `ProcessOutput` streams stay empty
    Inherit,
}

/// One engine invocation. `env` is added on top of the parent environment
/// for this child only.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub output: OutputMode,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(args: Vec<String>, timeout: Duration) -> Self {
        Self {
            args,
            env: BTreeMap::new(),
            output: OutputMode::Capture,
            timeout,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code; `None` when the child was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("{program} did not finish within {seconds}s")]
    TimedOut { program: String, seconds: u64 },

    #[error("I/O error while running {program}: {reason}")]
    Io { program: String, reason: String },
}

#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutput, ProcessError>;
}
