// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Fallback Name Resolver
//!
//! Last-resort recovery of the trusted person's name through the
//! language-model service, used only when rule extraction found nothing.
//!
//! This is a never-propagate boundary: every failure (no credential,
//! network or service error, timeout, malformed or empty response) comes
//! back as [`NameResolution::Unresolved`] and the pipeline continues. The
//! returned name is untrusted text and is only ever used for the
//! `trusted_person` field.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements the LLM fallback for a missing name

use crate::domain::llm::{GenerationOptions, LLMProvider};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest name accepted from the service
const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Resolved(String),
    /// Soft failure; the reason is for logs only
    Unresolved(String),
}

impl NameResolution {
    /// Resolved name, or empty string on soft failure
    pub fn into_name(self) -> String {
        match self {
            NameResolution::Resolved(name) => name,
            NameResolution::Unresolved(_) => String::new(),
        }
    }
}

#[derive(Deserialize)]
struct NamePayload {
    #[serde(default)]
    trusted_person: Option<String>,
}

pub struct FallbackNameResolver {
    provider: Option<Arc<dyn LLMProvider>>,
    options: GenerationOptions,
    timeout: Duration,
}

impl FallbackNameResolver {
    pub fn new(provider: Arc<dyn LLMProvider>, options: GenerationOptions, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            options,
            timeout,
        }
    }

    /// Resolver with no credential available; always soft-fails
    pub fn disabled() -> Self {
        Self {
            provider: None,
            options: GenerationOptions::default(),
            timeout: Duration::from_secs(1),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn prompt(text: &str) -> String {
        format!(
            "Extract only the trusted person's name from this command.\n\
             Return JSON: {{ \"trusted_person\": \"<name or empty>\" }}\n\n\
             Command:\n\"{}\"\n",
            text
        )
    }

    pub async fn resolve(&self, text: &str) -> NameResolution {
        let Some(provider) = &self.provider else {
            return NameResolution::Unresolved("no credential for the language-model service".into());
        };

        let prompt = Self::prompt(text);
        let response =
            match tokio::time::timeout(self.timeout, provider.generate(&prompt, &self.options)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!("Fallback name resolution failed: {}", e);
                    return NameResolution::Unresolved(e.to_string());
                }
                Err(_) => {
                    warn!(
                        "Fallback name resolution timed out after {}s",
                        self.timeout.as_secs()
                    );
                    return NameResolution::Unresolved("timed out".into());
                }
            };

        debug!(model = %response.model, tokens = response.usage.total_tokens, "Fallback resolver responded");
        parse_name(&response.text)
    }
}

/// Pull `trusted_person` out of a model reply, tolerating code fences.
pub fn parse_name(raw: &str) -> NameResolution {
    let body = strip_code_fence(raw);

    let payload: NamePayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => return NameResolution::Unresolved(format!("malformed response: {}", e)),
    };

    let name = payload.trusted_person.unwrap_or_default();
    let name = name.trim();

    if name.is_empty() {
        return NameResolution::Unresolved("service returned no name".into());
    }
    if name.len() > MAX_NAME_LEN || name.chars().any(char::is_control) {
        return NameResolution::Unresolved("service returned an implausible name".into());
    }

    NameResolution::Resolved(name.to_string())
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
