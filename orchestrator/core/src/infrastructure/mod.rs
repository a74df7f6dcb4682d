// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod llm;
pub mod process;

pub use process::CommandInvoker;
