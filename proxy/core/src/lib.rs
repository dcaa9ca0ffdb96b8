// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ollama Bridge Core
//!
//! Serves the Ollama HTTP API and forwards each request to Anthropic or
//! OpenAI, translating request and reply shapes on the way.
//!
//! # Architecture
//!
//! - **domain:** catalog, filter rules, token budget, wire types, config
//! - **application:** translation, synthesized streaming, catalog population
//! - **infrastructure:** HTTP adapters for each provider and the registry
//! - **presentation:** axum router

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
