// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Survival Agent CLI
//!
//! The `survival-agent` binary turns one natural-language safety command
//! into an armed Survival Agent on the connected Android device.
//!
//! ## Commands
//!
//! - `survival-agent "<command>"` / `survival-agent run "<command>"` - Gate, interpret once, execute with key rotation
//! - `survival-agent interpret "<command>"` - Print the structured intent and compiled goal as JSON
//! - `survival-agent ping` - Check that the automation engine and device are ready
//! - `survival-agent config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use survival_agent::commands::{self, ConfigCommand};

/// Survival Agent - arm on-device protection from a plain-language command
#[derive(Parser)]
#[command(name = "survival-agent")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "SURVIVAL_AGENT_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Load environment variables (API keys) from this file instead of ./.env
    #[arg(long, global = true, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SURVIVAL_AGENT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Natural-language command, e.g. "set up agent for Aryan, hiking for 2 hours"
    #[arg(value_name = "COMMAND")]
    text: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check readiness, interpret once, then execute with API key rotation
    #[command(name = "run")]
    Run {
        #[arg(value_name = "COMMAND")]
        text: String,
    },

    /// Interpret a command and print the result as JSON (no device needed)
    #[command(name = "interpret")]
    Interpret {
        #[arg(value_name = "COMMAND")]
        text: String,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check that the automation engine reports the device ready
    #[command(name = "ping")]
    Ping,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = load_env(cli.env_file.as_deref()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    let result = match (cli.command, cli.text) {
        (Some(Commands::Run { text }), _) | (None, Some(text)) => {
            commands::run::handle_command(&text, cli.config).await
        }
        (Some(Commands::Interpret { text, compact }), _) => {
            commands::interpret::handle_command(&text, compact, cli.config).await
        }
        (Some(Commands::Ping), _) => commands::ping::handle_command(cli.config).await,
        (Some(Commands::Config { command }), _) => {
            commands::config::handle_command(command, cli.config).await
        }
        (None, None) => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}

/// Populate the process environment from a dotenv file. An explicit file
/// must exist; the default ./.env is optional.
fn load_env(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load environment file {:?}", path))?;
        }
        None => {
            if let Ok(path) = dotenvy::dotenv() {
                tracing::debug!("Loaded environment from {:?}", path);
            }
        }
    }
    Ok(())
}
