// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Interpretation only: prints the structured intent and compiled goal as
//! JSON without touching the device.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::warn;

use survival_agent_core::application::{FallbackNameResolver, IntentInterpreter};
use survival_agent_core::domain::agent_config::AgentConfigSpec;
use survival_agent_core::domain::credentials::Credential;
use survival_agent_core::domain::llm::{GenerationOptions, LLMProviderFactory};
use survival_agent_core::infrastructure::llm::ProviderRegistry;

pub async fn handle_command(text: &str, compact: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let spec = &config.spec;

    let resolver = build_resolver(spec, spec.credentials.interpretation_credential())?;
    let output = IntentInterpreter::new(resolver)
        .interpret_and_compile(text)
        .await?;

    let json = if compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .context("Failed to serialize interpretation")?;
    println!("{}", json);

    Ok(())
}

/// Resolver bound to the single interpretation credential. Without one the
/// rule extractor runs alone.
fn build_resolver(spec: &AgentConfigSpec, key: Option<String>) -> Result<FallbackNameResolver> {
    let key = match key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => {
            warn!(
                "{} not set, fallback name resolution disabled",
                spec.credentials.credential_env
            );
            return Ok(FallbackNameResolver::disabled());
        }
    };

    let provider = ProviderRegistry::from_config(&spec.llm)?.for_credential(&Credential::new(key))?;
    let options = GenerationOptions {
        max_tokens: Some(spec.llm.max_tokens),
        temperature: Some(spec.llm.temperature),
        json_response: true,
    };

    Ok(FallbackNameResolver::new(provider, options, spec.llm.timeout()))
}
