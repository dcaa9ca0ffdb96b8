// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Translation Service - Ollama requests in, Ollama replies out
//
// Resolves the public model name, budgets the output tokens, hands a
// provider-neutral request to the backend registry and wraps the reply in
// the Ollama response shape.

use crate::domain::budget::{self, TooLong};
use crate::domain::catalog::{ModelCatalog, ModelEntry};
use crate::domain::llm::{self, BackendReply, BackendRequest, ChatMessage};
use crate::domain::ollama::{self, ChatResponse, GenerateResponse, OllamaReply, ReplyKind};
use crate::infrastructure::llm::{BackendRegistry, DispatchError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error(transparent)]
    RequestTooLong(#[from] TooLong),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("invalid response type")]
    InvalidResponseShape,
}

impl ProxyError {
    /// Errors caused by the request itself rather than a backend
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::ModelNotFound(_) | ProxyError::RequestTooLong(_))
    }
}

/// Use case behind `/api/generate` and `/api/chat`
#[derive(Clone)]
pub struct ProxyService {
    catalog: Arc<RwLock<ModelCatalog>>,
    registry: Arc<BackendRegistry>,
}

impl ProxyService {
    pub fn new(catalog: ModelCatalog, registry: BackendRegistry) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            registry: Arc::new(registry),
        }
    }

    pub fn catalog(&self) -> &Arc<RwLock<ModelCatalog>> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    // The guard is released before any await
    fn resolve(&self, public_name: &str) -> Result<ModelEntry, ProxyError> {
        self.catalog
            .read()
            .lookup(public_name)
            .filter(|entry| entry.enabled)
            .cloned()
            .ok_or_else(|| ProxyError::ModelNotFound(public_name.to_string()))
    }

    pub async fn generate(&self, req: &ollama::GenerateRequest) -> Result<GenerateResponse, ProxyError> {
        let entry = self.resolve(&req.model)?;

        let as_messages = [ChatMessage::new("user", req.prompt.as_str())];
        let max_tokens = budget::compute_max_output_tokens(entry.context_window, &as_messages);
        debug!(model = %req.model, max_tokens, "Budgeted generate request");

        let request = BackendRequest::Generate(llm::GenerateRequest {
            model: entry.provider_model_id.clone(),
            prompt: req.prompt.clone(),
            max_tokens,
            options: req.sampling_options(),
        });

        match self.registry.dispatch(&entry, request).await {
            Ok(BackendReply::Generate(result)) => Ok(GenerateResponse {
                model: req.model.clone(),
                created_at: result.created_at,
                response: result.content,
                done: true,
                context: Vec::new(),
            }),
            Ok(BackendReply::Chat(_)) => Err(ProxyError::InvalidResponseShape),
            Err(e) => {
                error!("Generate request for {} failed: {}", req.model, e);
                Err(e.into())
            }
        }
    }

    pub async fn chat(&self, req: &ollama::ChatRequest) -> Result<ChatResponse, ProxyError> {
        let entry = self.resolve(&req.model)?;

        budget::validate_within_limits(entry.context_window, &req.messages)?;
        let max_tokens = budget::compute_max_output_tokens(entry.context_window, &req.messages);
        debug!(
            model = %req.model,
            messages = req.messages.len(),
            max_tokens,
            "Budgeted chat request"
        );

        let request = BackendRequest::Chat(llm::ChatRequest {
            model: entry.provider_model_id.clone(),
            messages: req.messages.clone(),
            max_tokens,
            options: req.sampling_options(),
        });

        match self.registry.dispatch(&entry, request).await {
            Ok(BackendReply::Chat(result)) => Ok(ChatResponse {
                model: req.model.clone(),
                created_at: result.created_at,
                message: ChatMessage::new("assistant", result.message.content),
                done: true,
                context: Vec::new(),
            }),
            Ok(BackendReply::Generate(_)) => Err(ProxyError::InvalidResponseShape),
            Err(e) => {
                error!("Chat request for {} failed: {}", req.model, e);
                Err(e.into())
            }
        }
    }

    /// Run either endpoint and return the reply in its untagged form
    pub async fn reply(&self, request: &ProxyRequest) -> Result<OllamaReply, ProxyError> {
        match request {
            ProxyRequest::Generate(req) => self.generate(req).await.map(OllamaReply::Generate),
            ProxyRequest::Chat(req) => self.chat(req).await.map(OllamaReply::Chat),
        }
    }
}

/// Parsed body of either endpoint
#[derive(Debug, Clone)]
pub enum ProxyRequest {
    Generate(ollama::GenerateRequest),
    Chat(ollama::ChatRequest),
}

impl ProxyRequest {
    pub fn kind(&self) -> ReplyKind {
        match self {
            ProxyRequest::Generate(_) => ReplyKind::Generate,
            ProxyRequest::Chat(_) => ReplyKind::Chat,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProxyRequest::Generate(req) => &req.model,
            ProxyRequest::Chat(req) => &req.model,
        }
    }

    pub fn stream(&self) -> bool {
        match self {
            ProxyRequest::Generate(req) => req.stream,
            ProxyRequest::Chat(req) => req.stream,
        }
    }
}
