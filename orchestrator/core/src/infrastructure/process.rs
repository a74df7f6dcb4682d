// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::process::{Invocation, OutputMode, ProcessError, ProcessInvoker, ProcessOutput};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs the automation engine as a local subprocess.
pub struct CommandInvoker {
    program: String,
}

impl CommandInvoker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ProcessInvoker for CommandInvoker {
    async fn invoke(&self, invocation: Invocation) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&invocation.args)
            .envs(&invocation.env)
            .stdin(Stdio::null())
            // A timed-out child is dropped, and with it killed
            .kill_on_drop(true);

        match invocation.output {
            OutputMode::Capture => cmd.stdout(Stdio::piped()).stderr(Stdio::piped()),
            OutputMode::Inherit => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
        };

        debug!(program = %self.program, args = invocation.args.len(), "Spawning subprocess");

        let child = cmd.spawn().map_err(|e| ProcessError::SpawnFailed {
            program: self.program.clone(),
            reason: e.to_string(),
        })?;

        let output = tokio::time::timeout(invocation.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProcessError::TimedOut {
                program: self.program.clone(),
                seconds: invocation.timeout.as_secs(),
            })?
            .map_err(|e| ProcessError::Io {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
