// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Goal Compiler
//!
//! Renders an [`InterpretedCommand`] into the fixed action plan handed to
//! the device automation engine.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements goal compilation

use crate::domain::intent::InterpretedCommand;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GoalError {
    #[error("Trusted person could not be resolved")]
    UnresolvedTrustedPerson,
}

/// Ordered, immutable action plan. Serializes as the joined plan text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGoal {
    steps: Vec<String>,
}

impl CompiledGoal {
    /// Compile the nine-step plan. Fails only when no trusted person survived
    /// both extraction stages.
    pub fn compile(command: &InterpretedCommand) -> Result<Self, GoalError> {
        if !command.has_trusted_person() {
            return Err(GoalError::UnresolvedTrustedPerson);
        }

        let name = &command.trusted_person;
        let code = command.activation_code.to_string();
        let intent = command.situation_intent.display_label();

        let steps = vec![
            "Open the Survival Agent app.".to_string(),
            format!("Open Contacts and find the contact named {}.", name),
            "Open the Survival Agent app and then fill in the Trusted person field.".to_string(),
            "Click on the Activation code (SMS) field to focus it.".to_string(),
            format!("Enter {} into the Activation code (SMS) field.", code),
            "Open device Settings and check the battery capacity.".to_string(),
            "Return to the Survival Agent app and fill in the battery capacity field.".to_string(),
            format!("Select the {} situation context.", intent),
            "Tap the ARM AGENT button to activate protection.".to_string(),
        ];

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Plan text as passed to the engine, one step per line.
    pub fn text(&self) -> String {
        self.steps.join("\n")
    }
}

impl fmt::Display for CompiledGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Serialize for CompiledGoal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text())
    }
}
