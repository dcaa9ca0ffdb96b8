// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Provider-neutral request and reply shapes exchanged with backend adapters.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Backend adapter interface (Anti-Corruption Layer)

// Backend Adapter Domain Interface
//
// The translation layer only ever speaks these generic shapes. Each cloud
// provider gets one adapter in infrastructure/llm/ that converts them to and
// from its own wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::catalog::ProviderId;

/// Domain interface for cloud LLM backends
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Single-prompt completion
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, LLMError>;

    /// Multi-turn chat completion
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResult, LLMError>;

    /// Models offered by the provider's listing endpoint
    async fn list_models(&self) -> Result<Vec<ListedModel>, LLMError>;

    /// True iff credentials are configured
    fn is_available(&self) -> bool;

    fn provider(&self) -> ProviderId;

    fn name(&self) -> &str {
        self.provider().as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Sampling knobs forwarded from the client when present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingOptions {
    pub temperature: Option<f32>,
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Provider-specific model id
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub options: SamplingOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Provider-specific model id
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub options: SamplingOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub model: String,
    pub content: String,
    /// Opaque provider token (message id or creation timestamp)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResult {
    pub model: String,
    pub message: ChatMessage,
    pub created_at: String,
}

/// Request handed to the registry; the variant selects the adapter method
#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    Generate(GenerateRequest),
    Chat(ChatRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    Generate(GenerateResult),
    Chat(ChatResult),
}

/// One model reported by a provider's listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedModel {
    pub id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub context_window: Option<u32>,
}

/// Errors raised by a backend adapter
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Model not found upstream: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LLMError {
    /// Map a non-success upstream status to an error carrying the raw body
    pub fn from_status(vendor: &str, status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => LLMError::Authentication(format!("{} API error: {}", vendor, body)),
            429 => LLMError::RateLimit(format!("{} API error: {}", vendor, body)),
            404 => LLMError::ModelNotFound(format!("{} ({})", model, body)),
            _ => LLMError::Provider(format!("{} API error (status {}): {}", vendor, status, body)),
        }
    }
}
