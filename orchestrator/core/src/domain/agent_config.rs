// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Configuration Types
//
// Defines the configuration schema for the Survival Agent runner:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Automation engine invocation (binary, readiness probe, step budget)
// - Language-model endpoint used by the fallback name resolver
// - Names of the environment variables that hold credentials
//
// Secrets are never part of the manifest. Only the variable names are.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_VERSION: &str = "survival-agent/v1";
pub const KIND: &str = "AgentConfig";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfigManifest {
    /// API version (must be "survival-agent/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "AgentConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: AgentConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable name of this runner
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfigSpec {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// External device automation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Executable name or path
    #[serde(default = "default_engine_binary")]
    pub binary: String,

    /// Arguments of the health-check subcommand
    #[serde(default = "default_ping_args")]
    pub ping_args: Vec<String>,

    /// Substring of the probe output that means the device is ready
    #[serde(default = "default_ready_signal")]
    pub ready_signal: String,

    /// Provider name passed to the engine (`--provider`)
    #[serde(default = "default_engine_provider")]
    pub provider: String,

    /// Model identifier passed to the engine (`--model`)
    #[serde(default = "default_model")]
    pub model: String,

    /// Pass `--vision`
    #[serde(default = "default_true")]
    pub vision: bool,

    /// Step budget per run (`--steps`)
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Fixed pause between credential attempts
    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_execution_timeout")]
    pub execution_timeout_secs: u64,

    /// Extra environment for every engine invocation
    #[serde(default = "default_engine_env")]
    pub env: BTreeMap<String, String>,
}

impl EngineConfig {
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_engine_binary(),
            ping_args: default_ping_args(),
            ready_signal: default_ready_signal(),
            provider: default_engine_provider(),
            model: default_model(),
            vision: true,
            max_steps: default_max_steps(),
            retry_pause_ms: default_retry_pause_ms(),
            probe_timeout_secs: default_probe_timeout(),
            execution_timeout_secs: default_execution_timeout(),
            env: default_engine_env(),
        }
    }
}

/// Language-model service used by the fallback name resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: f32,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
            max_tokens: default_llm_max_tokens(),
            temperature: 0.0,
        }
    }
}

/// Environment variable names holding secrets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Single credential for standalone interpretation; also the variable the
    /// engine reads its credential from
    #[serde(default = "default_credential_env")]
    pub credential_env: String,

    /// Comma-separated rotation list
    #[serde(default = "default_rotation_env")]
    pub rotation_env: String,
}

impl CredentialsConfig {
    pub fn interpretation_credential(&self) -> Option<String> {
        std::env::var(&self.credential_env).ok()
    }

    pub fn rotation_list(&self) -> Option<String> {
        std::env::var(&self.rotation_env).ok()
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            credential_env: default_credential_env(),
            rotation_env: default_rotation_env(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_engine_binary() -> String {
    "droidrun".to_string()
}

fn default_ping_args() -> Vec<String> {
    vec!["ping".to_string()]
}

fn default_ready_signal() -> String {
    "You're good to go!".to_string()
}

fn default_engine_provider() -> String {
    "GoogleGenAI".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_max_steps() -> u32 {
    30
}

fn default_retry_pause_ms() -> u64 {
    1000
}

fn default_probe_timeout() -> u64 {
    60
}

fn default_execution_timeout() -> u64 {
    900
}

fn default_engine_env() -> BTreeMap<String, String> {
    BTreeMap::from([("PYTHONUTF8".to_string(), "1".to_string())])
}

fn default_llm_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_llm_timeout() -> u64 {
    20
}

fn default_llm_max_tokens() -> u32 {
    256
}

fn default_credential_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_rotation_env() -> String {
    "GOOGLE_API_KEYS".to_string()
}

impl Default for AgentConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "survival-agent".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
            },
            spec: AgentConfigSpec::default(),
        }
    }
}

impl AgentConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate paths in discovery order (existing or not)
    pub fn discovery_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var("SURVIVAL_AGENT_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("./survival-agent.yaml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".survival-agent").join("config.yaml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/survival-agent/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\SurvivalAgent\\config.yaml"));

        paths
    }

    /// Discover configuration file using precedence order
    /// 1. SURVIVAL_AGENT_CONFIG_PATH environment variable
    /// 2. ./survival-agent.yaml (working directory)
    /// 3. ~/.survival-agent/config.yaml (user home)
    /// 4. /etc/survival-agent/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        Self::discovery_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SURVIVAL_AGENT_ENGINE_BIN") {
            if !val.trim().is_empty() {
                tracing::info!("Environment override: SURVIVAL_AGENT_ENGINE_BIN={}", val);
                self.spec.engine.binary = val;
            }
        }

        if let Ok(val) = std::env::var("SURVIVAL_AGENT_MAX_STEPS") {
            match val.trim().parse::<u32>() {
                Ok(steps) if steps > 0 => {
                    tracing::info!("Environment override: SURVIVAL_AGENT_MAX_STEPS={}", steps);
                    self.spec.engine.max_steps = steps;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for SURVIVAL_AGENT_MAX_STEPS: '{}'. Expected a positive integer. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let engine = &self.spec.engine;
        if engine.binary.trim().is_empty() {
            anyhow::bail!("spec.engine.binary cannot be empty");
        }
        if engine.ready_signal.is_empty() {
            anyhow::bail!("spec.engine.ready_signal cannot be empty");
        }
        if engine.model.is_empty() || engine.provider.is_empty() {
            anyhow::bail!("spec.engine.provider and spec.engine.model cannot be empty");
        }
        if engine.max_steps == 0 {
            anyhow::bail!("spec.engine.max_steps must be greater than zero");
        }
        if engine.probe_timeout_secs == 0 || engine.execution_timeout_secs == 0 {
            anyhow::bail!("spec.engine timeouts must be greater than zero");
        }

        let llm = &self.spec.llm;
        if llm.endpoint.is_empty() || llm.model.is_empty() {
            anyhow::bail!("spec.llm.endpoint and spec.llm.model cannot be empty");
        }
        if llm.timeout_secs == 0 {
            anyhow::bail!("spec.llm.timeout_secs must be greater than zero");
        }

        let creds = &self.spec.credentials;
        if creds.credential_env.is_empty() || creds.rotation_env.is_empty() {
            anyhow::bail!("spec.credentials variable names cannot be empty");
        }

        Ok(())
    }
}
