// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Survival Agent CLI

pub mod config;
pub mod interpret;
pub mod ping;
pub mod run;

pub use self::config::ConfigCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;
use survival_agent_core::domain::agent_config::AgentConfigManifest;

/// Load, override and validate configuration for a command
pub(crate) fn load_config(config_path: Option<PathBuf>) -> Result<AgentConfigManifest> {
    let config =
        AgentConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}
