// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod catalog_loader;
pub mod streaming;
pub mod translation;

pub use catalog_loader::CatalogError;
pub use streaming::StreamingEmitter;
pub use translation::{ProxyError, ProxyRequest, ProxyService};
