// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Credentials
//!
//! Secrets for the quota-limited language-model service. A [`Credential`]
//! never prints its value; only [`Credential::expose`] hands it out, at the
//! point where it is injected into an outbound call.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements the ordered credential list used for rotation

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0} not set")]
    Missing(String),

    #[error("No valid API keys found in {0}")]
    Empty(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Ordered, non-empty, distinct credentials.
#[derive(Clone)]
pub struct CredentialSet {
    credentials: Vec<Credential>,
}

impl CredentialSet {
    /// Parse a comma-separated list. Blank entries and repeats are dropped;
    /// `source` names the configuration value for error messages.
    pub fn parse(raw: Option<&str>, source: &str) -> Result<Self, CredentialError> {
        let raw = match raw {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Err(CredentialError::Missing(source.to_string())),
        };

        let mut credentials: Vec<Credential> = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if !credentials.iter().any(|c| c.expose() == entry) {
                credentials.push(Credential::new(entry));
            }
        }

        if credentials.is_empty() {
            return Err(CredentialError::Empty(source.to_string()));
        }

        Ok(Self { credentials })
    }

    /// Always present; the set is never empty.
    pub fn first(&self) -> &Credential {
        &self.credentials[0]
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("len", &self.credentials.len())
            .finish()
    }
}
