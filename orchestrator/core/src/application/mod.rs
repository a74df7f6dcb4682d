// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod interpreter;
pub mod name_resolver;
pub mod orchestrator;
pub mod readiness;

// Re-export use cases for convenience
pub use interpreter::{IntentInterpreter, InterpretationOutput};
pub use name_resolver::{FallbackNameResolver, NameResolution};
pub use orchestrator::{CredentialRotationOrchestrator, OrchestratorError, RunReport};
pub use readiness::{ReadinessError, ReadinessGate};
