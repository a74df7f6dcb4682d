// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - credential-bound provider construction
//
// Holds one shared HTTP client and hands out adapters bound to whichever
// credential the caller names, so no credential lives in ambient state.

use crate::domain::agent_config::LlmConfig;
use crate::domain::credentials::Credential;
use crate::domain::llm::{LLMError, LLMProvider, LLMProviderFactory};
use std::sync::Arc;
use tracing::debug;

use super::gemini::GeminiAdapter;

pub struct ProviderRegistry {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ProviderRegistry {
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

impl LLMProviderFactory for ProviderRegistry {
    fn for_credential(&self, credential: &Credential) -> Result<Arc<dyn LLMProvider>, LLMError> {
        if credential.expose().trim().is_empty() {
            return Err(LLMError::Authentication("empty API key".into()));
        }

        debug!(model = %self.config.model, "Binding language-model provider to credential");
        Ok(Arc::new(GeminiAdapter::new(
            self.client.clone(),
            self.config.endpoint.clone(),
            credential.expose().to_string(),
            self.config.model.clone(),
            self.config.timeout(),
        )))
    }
}
