// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use survival_agent_core::domain::agent_config::AgentConfigManifest;

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./survival-agent.yaml")]
        output: PathBuf,

        /// Include every setting with comments
        #[arg(long)]
        examples: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(&output, examples, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = AgentConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        for (i, path) in AgentConfigManifest::discovery_paths().iter().enumerate() {
            let marker = if path.exists() {
                "(found)".green()
            } else {
                "(missing)".dimmed()
            };
            println!("  {}. {} {}", i + 2, path.display(), marker);
        }
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!();

    let engine = &config.spec.engine;
    println!("{}", "Automation Engine:".bold());
    println!("  Binary: {}", engine.binary);
    println!("  Probe: {} {}", engine.binary, engine.ping_args.join(" "));
    println!("  Ready signal: {:?}", engine.ready_signal);
    println!("  Provider: {} ({})", engine.provider, engine.model);
    println!("  Vision: {}", engine.vision);
    println!("  Max steps: {}", engine.max_steps);
    println!("  Pause between keys: {}ms", engine.retry_pause_ms);
    println!(
        "  Timeouts: probe {}s, run {}s",
        engine.probe_timeout_secs, engine.execution_timeout_secs
    );
    println!();

    let llm = &config.spec.llm;
    println!("{}", "Name Resolver LLM:".bold());
    println!("  Endpoint: {}", llm.endpoint);
    println!("  Model: {}", llm.model);
    println!("  Timeout: {}s", llm.timeout_secs);
    println!();

    let creds = &config.spec.credentials;
    println!("{}", "Credentials:".bold());
    println!(
        "  {}: {}",
        creds.credential_env,
        presence(creds.interpretation_credential().is_some())
    );
    let rotation = creds
        .rotation_list()
        .map(|raw| raw.split(',').filter(|k| !k.trim().is_empty()).count());
    match rotation {
        Some(n) => println!("  {}: {} key(s)", creds.rotation_env, n),
        None => println!("  {}: {}", creds.rotation_env, presence(false)),
    }
    println!();

    Ok(())
}

fn presence(set: bool) -> colored::ColoredString {
    if set {
        "set".green()
    } else {
        "(not set)".dimmed()
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = AgentConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_valid_manifests() {
        for template in [MINIMAL_TEMPLATE, EXAMPLES_TEMPLATE] {
            let manifest = AgentConfigManifest::from_yaml_str(template).unwrap();
            manifest.validate().unwrap();
            assert_eq!(manifest.spec.engine.binary, "droidrun");
            assert_eq!(manifest.spec.credentials.rotation_env, "GOOGLE_API_KEYS");
        }
    }

    #[tokio::test]
    async fn test_generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survival-agent.yaml");

        generate(&path, false, false).await.unwrap();
        assert!(generate(&path, true, false).await.is_err());
        generate(&path, true, true).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, EXAMPLES_TEMPLATE);
    }

    #[tokio::test]
    async fn test_validate_rejects_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(
            &path,
            "apiVersion: survival-agent/v1\nkind: NodeConfig\nmetadata:\n  name: x\nspec: {}\n",
        )
        .unwrap();

        assert!(validate(Some(path)).await.is_err());
    }
}
