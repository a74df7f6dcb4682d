// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Domain Interface (Anti-Corruption Layer)
//
// Isolates the fallback name resolver from the vendor API. Providers are
// bound to one credential at construction; the factory is how callers pick
// which credential an outbound call is charged to.

use crate::domain::credentials::Credential;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Domain interface for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError>;
}

/// Builds a provider bound to an explicit credential
pub trait LLMProviderFactory: Send + Sync {
    fn for_credential(&self, credential: &Credential) -> Result<Arc<dyn LLMProvider>, LLMError>;
}

/// Options for LLM generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: Option<f32>,

    /// Ask the provider for a JSON-only response
    #[serde(default)]
    pub json_response: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: Some(256),
            temperature: Some(0.0),
            json_response: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,

    /// Token usage stats
    pub usage: TokenUsage,

    /// Model used (e.g., "gemini-2.5-flash-lite")
    pub model: String,

    /// Why generation stopped
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider error: {0}")]
    Provider(String),
}
