// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Domain types and rules of the proxy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Model catalog, token budget, filter rules, backend
//!   interface, Ollama wire schema and configuration

pub mod budget;
pub mod catalog;
pub mod filter;
pub mod llm;
pub mod ollama;
pub mod proxy_config;
