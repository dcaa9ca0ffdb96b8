// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Backend Registry - Provider Lookup and Dispatch
//
// Holds one adapter per provider and routes a catalog entry's request to the
// adapter that owns it. Only providers with a configured credential are
// registered.

use crate::domain::catalog::{ModelEntry, ProviderId};
use crate::domain::llm::{BackendAdapter, BackendReply, BackendRequest, LLMError};
use crate::domain::proxy_config::ProxyConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::anthropic::AnthropicAdapter;
use super::openai::OpenAIAdapter;

/// Errors raised while routing a request to a backend
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("backend not registered: {0}")]
    BackendNotRegistered(ProviderId),

    #[error("backend not available: {0}")]
    BackendUnavailable(ProviderId),

    #[error(transparent)]
    Upstream(#[from] LLMError),
}

/// Registry of backend adapters keyed by provider
#[derive(Default)]
pub struct BackendRegistry {
    adapters: HashMap<ProviderId, Arc<dyn BackendAdapter>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every provider that has a credential
    pub fn from_config(config: &ProxyConfig) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        let timeout = config.backends.request_timeout();

        info!("Initializing backend registry");

        let anthropic_key = config.credentials.api_key(ProviderId::Anthropic);
        if anthropic_key.is_empty() {
            info!("Anthropic API key not configured, skipping backend");
        } else {
            let adapter = AnthropicAdapter::new(
                config.backends.anthropic_base_url.clone(),
                anthropic_key,
                timeout,
            )?;
            registry.register(Arc::new(adapter));
        }

        let openai_key = config.credentials.api_key(ProviderId::OpenAI);
        if openai_key.is_empty() {
            info!("OpenAI API key not configured, skipping backend");
        } else {
            let adapter =
                OpenAIAdapter::new(config.backends.openai_base_url.clone(), openai_key, timeout)?;
            registry.register(Arc::new(adapter));
        }

        if registry.is_empty() {
            warn!("No backends registered - every model request will fail");
        }

        Ok(registry)
    }

    /// Register an adapter, replacing any previous one for the same provider
    pub fn register(&mut self, adapter: Arc<dyn BackendAdapter>) {
        let provider = adapter.provider();
        info!("Registered backend: {}", adapter.name());
        self.adapters.insert(provider, adapter);
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn BackendAdapter>> {
        self.adapters.get(&provider).cloned()
    }

    /// Providers whose adapter reports itself available, in stable order
    pub fn list_available(&self) -> Vec<ProviderId> {
        let mut available: Vec<ProviderId> = self
            .adapters
            .iter()
            .filter(|(_, adapter)| adapter.is_available())
            .map(|(provider, _)| *provider)
            .collect();
        available.sort();
        available
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Route a request to the adapter owning `entry`
    pub async fn dispatch(
        &self,
        entry: &ModelEntry,
        request: BackendRequest,
    ) -> Result<BackendReply, DispatchError> {
        let adapter = self
            .get(entry.provider)
            .ok_or(DispatchError::BackendNotRegistered(entry.provider))?;

        if !adapter.is_available() {
            return Err(DispatchError::BackendUnavailable(entry.provider));
        }

        debug!(
            model = %entry.public_name,
            provider = %entry.provider,
            provider_model_id = %entry.provider_model_id,
            "Dispatching request to backend"
        );

        let reply = match request {
            BackendRequest::Generate(req) => BackendReply::Generate(adapter.generate(&req).await?),
            BackendRequest::Chat(req) => BackendReply::Chat(adapter.chat(&req).await?),
        };

        Ok(reply)
    }
}
