// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain model: intents, rules, goals, credentials and the ports to the
//! language model and the automation engine.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod agent_config;
pub mod credentials;
pub mod goal;
pub mod intent;
pub mod llm;
pub mod process;
pub mod rules;
