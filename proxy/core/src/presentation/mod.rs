// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`ollama-bridge-core`)
//!
//! HTTP surface that parses Ollama requests and hands them to
//! [`crate::application::ProxyService`]. No translation logic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP/ndjson (Axum) | Ollama endpoints, CORS, synthesized streaming |

pub mod api;

pub use api::{app, AppState};
