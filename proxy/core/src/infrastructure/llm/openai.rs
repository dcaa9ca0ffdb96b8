// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI Backend Adapter
//
// Anti-Corruption Layer for the OpenAI Chat Completions API
// Also works with OpenAI-compatible gateways via a custom base URL

use crate::domain::catalog::ProviderId;
use crate::domain::llm::{
    BackendAdapter, ChatMessage, ChatRequest, ChatResult, GenerateRequest, GenerateResult,
    LLMError, ListedModel, SamplingOptions,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Models that reject `max_tokens` in favour of a newer parameter name.
/// The field is left out entirely for these ids.
pub const NEWER_MODELS: &[&str] = &["gpt-4o", "gpt-4o-mini", "gpt-5", "gpt-4.1", "gpt-4.5"];

pub fn is_newer_model(model: &str) -> bool {
    NEWER_MODELS.contains(&model)
}

pub struct OpenAIAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    created: i64,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIModelList {
    #[serde(default)]
    data: Vec<OpenAIModel>,
}

#[derive(Deserialize)]
struct OpenAIModel {
    id: String,
}

fn build_request<'a>(
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    options: &'a SamplingOptions,
) -> OpenAIRequest<'a> {
    OpenAIRequest {
        model,
        messages,
        max_tokens: (!is_newer_model(model)).then_some(max_tokens),
        temperature: options.temperature,
        stop: options.stop.as_deref(),
    }
}

impl OpenAIAdapter {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, LLMError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        options: &SamplingOptions,
    ) -> Result<(ChatMessage, String), LLMError> {
        let request = build_request(model, messages, max_tokens, options);

        debug!(model, max_tokens = ?request.max_tokens, "Sending OpenAI chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status("openai", status.as_u16(), error_text, model));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("No choices in response".into()))?;

        let role = if choice.message.role.is_empty() {
            "assistant".to_string()
        } else {
            choice.message.role
        };
        let message = ChatMessage::new(role, choice.message.content.unwrap_or_default());

        Ok((message, openai_response.created.to_string()))
    }
}

#[async_trait]
impl BackendAdapter for OpenAIAdapter {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, LLMError> {
        let messages = [ChatMessage::new("user", request.prompt.as_str())];
        let (message, created) = self
            .complete(&request.model, &messages, request.max_tokens, &request.options)
            .await?;

        Ok(GenerateResult {
            model: request.model.clone(),
            content: message.content,
            created_at: created,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResult, LLMError> {
        let (message, created) = self
            .complete(&request.model, &request.messages, request.max_tokens, &request.options)
            .await?;

        Ok(ChatResult {
            model: request.model.clone(),
            message,
            created_at: created,
        })
    }

    async fn list_models(&self) -> Result<Vec<ListedModel>, LLMError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status("openai", status.as_u16(), error_text, "models"));
        }

        let list: OpenAIModelList = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ListedModel {
                id: m.id,
                display_name: None,
                description: None,
                context_window: None,
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn provider(&self) -> ProviderId {
        ProviderId::OpenAI
    }
}
