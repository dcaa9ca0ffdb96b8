// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Backend Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the provider-neutral domain shapes and one
// cloud provider's HTTP API.

pub mod anthropic;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicAdapter;
pub use openai::OpenAIAdapter;
pub use registry::{BackendRegistry, DispatchError};
