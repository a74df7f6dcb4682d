// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Intent Interpreter
//!
//! Composes rule extraction with the fallback name resolver into a single
//! [`InterpretedCommand`], then pairs it with its compiled goal.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Implements free text to structured intent

use crate::application::name_resolver::{FallbackNameResolver, NameResolution};
use crate::domain::goal::{CompiledGoal, GoalError};
use crate::domain::intent::{Intent, InterpretedCommand, NameSource};
use crate::domain::rules;
use serde::Serialize;
use tracing::{debug, info};

/// Printable interpretation result:
/// `{interpreted_intent: {...}, droidrun_goal: "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct InterpretationOutput {
    pub interpreted_intent: InterpretedCommand,
    pub droidrun_goal: CompiledGoal,
}

pub struct IntentInterpreter {
    resolver: FallbackNameResolver,
}

impl IntentInterpreter {
    pub fn new(resolver: FallbackNameResolver) -> Self {
        Self { resolver }
    }

    /// Build the structured record. Never fails; an empty name is left for
    /// the goal compiler to reject.
    pub async fn interpret(&self, text: &str) -> InterpretedCommand {
        let mut name = rules::extract_name(text);
        let mut source = NameSource::Rule;

        if name.is_empty() {
            debug!("No trusted person found by rules, consulting fallback resolver");
            match self.resolver.resolve(text).await {
                NameResolution::Resolved(resolved) => {
                    name = resolved;
                    source = NameSource::Resolver;
                }
                NameResolution::Unresolved(reason) => {
                    debug!("Fallback resolver gave no name: {}", reason);
                    source = NameSource::Unresolved;
                }
            }
        }

        let activation_code = rules::infer_activation_code(text);
        // Re-coerce through the label so nothing outside the closed set escapes
        let situation_intent = Intent::coerce(rules::infer_intent(text).as_str());

        info!(
            activation_code = %activation_code,
            situation_intent = %situation_intent,
            name_source = ?source,
            "Command interpreted"
        );

        InterpretedCommand::new(name, activation_code, situation_intent, source)
    }

    /// Interpret and compile in one step
    pub async fn interpret_and_compile(&self, text: &str) -> Result<InterpretationOutput, GoalError> {
        let interpreted_intent = self.interpret(text).await;
        let droidrun_goal = CompiledGoal::compile(&interpreted_intent)?;
        Ok(InterpretationOutput {
            interpreted_intent,
            droidrun_goal,
        })
    }
}
