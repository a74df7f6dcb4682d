// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Survival Agent core
//!
//! Turns one free-text safety command into a structured intent, compiles it
//! into an automation goal and executes that goal on the device, rotating
//! API keys until one run succeeds.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, use cases and adapters behind the CLI

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
