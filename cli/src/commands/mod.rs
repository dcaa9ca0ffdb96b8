// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the ollama-bridge CLI

pub mod config;
pub mod models;

pub use self::config::ConfigCommand;
pub use self::models::ModelsArgs;
