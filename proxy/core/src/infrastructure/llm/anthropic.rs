// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Anthropic Backend Adapter
//
// Anti-Corruption Layer for the Anthropic Messages API

use crate::domain::catalog::ProviderId;
use crate::domain::llm::{
    BackendAdapter, ChatMessage, ChatRequest, ChatResult, GenerateRequest, GenerateResult,
    LLMError, ListedModel, SamplingOptions,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    id: String,
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicModelList {
    #[serde(default)]
    data: Vec<AnthropicModel>,
}

#[derive(Deserialize)]
struct AnthropicModel {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    context_size: Option<u32>,
}

impl AnthropicAdapter {
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

    async fn create_message(
        &self,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
        options: &SamplingOptions,
    ) -> Result<(String, String), LLMError> {
        // The Messages API takes system prompts out of band
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        let request = AnthropicRequest {
            model,
            max_tokens,
            messages: messages
                .iter()
                .filter(|m| m.role != "system")
                .map(|m| AnthropicMessage {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            temperature: options.temperature,
            stop_sequences: options.stop.as_deref(),
        };

        debug!(model, max_tokens, "Sending Anthropic messages request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status("anthropic", status.as_u16(), error_text, model));
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = anthropic_response
            .content
            .into_iter()
            .find(|c| c.kind == "text" || c.kind.is_empty())
            .and_then(|c| c.text)
            .ok_or_else(|| LLMError::InvalidResponse("Response contained no text content".into()))?;

        Ok((text, anthropic_response.id))
    }
}

#[async_trait]
impl BackendAdapter for AnthropicAdapter {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, LLMError> {
        let messages = [ChatMessage::new("user", request.prompt.as_str())];
        let (content, id) = self
            .create_message(&request.model, &messages, request.max_tokens, &request.options)
            .await?;

        Ok(GenerateResult {
            model: request.model.clone(),
            content,
            created_at: id,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResult, LLMError> {
        let (content, id) = self
            .create_message(&request.model, &request.messages, request.max_tokens, &request.options)
            .await?;

        Ok(ChatResult {
            model: request.model.clone(),
            message: ChatMessage::new("assistant", content),
            created_at: id,
        })
    }

    async fn list_models(&self) -> Result<Vec<ListedModel>, LLMError> {
        let response = self
            .client
            .get(format!("{}/v1/models?limit=1000", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map_err(|e| LLMError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status("anthropic", status.as_u16(), error_text, "models"));
        }

        let list: AnthropicModelList = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Failed to parse model list: {}", e)))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ListedModel {
                id: m.id,
                display_name: m.display_name,
                description: m.description,
                context_window: m.context_size,
            })
            .collect())
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn adapter(server: &mockito::ServerGuard) -> AnthropicAdapter {
        AnthropicAdapter::new(server.url(), "sk-ant-test".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_chat_translates_request_and_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::Json(json!({
                "model": "claude-3-5-sonnet-20241022",
                "max_tokens": 884,
                "system": "Be brief.",
                "messages": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello"},
                    {"role": "user", "content": "How are you?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "msg_01ABC",
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "text", "text": "Doing well."}],
                    "model": "claude-3-5-sonnet-20241022",
                    "stop_reason": "end_turn",
                    "usage": {"input_tokens": 12, "output_tokens": 4}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let request = ChatRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            messages: vec![
                ChatMessage::new("system", "Be brief."),
                ChatMessage::new("user", "Hi"),
                ChatMessage::new("assistant", "Hello"),
                ChatMessage::new("user", "How are you?"),
            ],
            max_tokens: 884,
            options: SamplingOptions::default(),
        };

        let result = adapter(&server).chat(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(result.message, ChatMessage::new("assistant", "Doing well."));
        assert_eq!(result.created_at, "msg_01ABC");
        assert_eq!(result.model, "claude-3-5-sonnet-20241022");
    }

    #[tokio::test]
    async fn test_generate_wraps_prompt_as_user_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::PartialJson(json!({
                "max_tokens": 4000,
                "temperature": 0.5,
                "messages": [{"role": "user", "content": "Write a haiku"}]
            })))
            .with_status(200)
            .with_body(r#"{"id":"msg_02","content":[{"type":"text","text":"Leaves fall"}]}"#)
            .create_async()
            .await;

        let request = GenerateRequest {
            model: "claude-3-5-haiku-20241022".to_string(),
            prompt: "Write a haiku".to_string(),
            max_tokens: 4000,
            options: SamplingOptions {
                temperature: Some(0.5),
                stop: None,
            },
        };

        let result = adapter(&server).generate(&request).await.unwrap();
        mock.assert_async().await;
        assert_eq!(result.content, "Leaves fall");
        assert_eq!(result.created_at, "msg_02");
    }

    #[tokio::test]
    async fn test_upstream_error_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(400)
            .with_body(r#"{"type":"error","error":{"message":"max_tokens too large"}}"#)
            .create_async()
            .await;

        let request = GenerateRequest {
            model: "claude-3-opus-20240229".to_string(),
            prompt: "x".to_string(),
            max_tokens: 100,
            options: SamplingOptions::default(),
        };

        let err = adapter(&server).generate(&request).await.unwrap_err();
        assert!(matches!(err, LLMError::Provider(_)));
        assert!(err.to_string().contains("max_tokens too large"));
    }

    #[tokio::test]
    async fn test_auth_failure_and_empty_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body("invalid x-api-key")
            .create_async()
            .await;

        let request = GenerateRequest {
            model: "claude-3-opus-20240229".to_string(),
            prompt: "x".to_string(),
            max_tokens: 100,
            options: SamplingOptions::default(),
        };
        let err = adapter(&server).generate(&request).await.unwrap_err();
        assert!(matches!(err, LLMError::Authentication(_)));

        let mut empty = mockito::Server::new_async().await;
        empty
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"id":"msg_03","content":[]}"#)
            .create_async()
            .await;
        let err = adapter(&empty).generate(&request).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/models")
            .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
            .match_header("x-api-key", "sk-ant-test")
            .with_status(200)
            .with_body(
                json!({
                    "data": [
                        {"id": "claude-3-5-sonnet-20241022", "type": "model", "display_name": "Claude 3.5 Sonnet (New)"},
                        {"id": "claude-3-opus-20240229", "type": "model"}
                    ],
                    "has_more": false
                })
                .to_string(),
            )
            .create_async()
            .await;

        let models = adapter(&server).list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "claude-3-5-sonnet-20241022");
        assert_eq!(models[0].display_name.as_deref(), Some("Claude 3.5 Sonnet (New)"));
        assert_eq!(models[1].display_name, None);
        assert_eq!(models[1].context_window, None);
    }

    #[test]
    fn test_availability() {
        let adapter = AnthropicAdapter::new(
            "https://api.anthropic.com/".to_string(),
            String::new(),
            Duration::from_secs(30),
        )
        .unwrap();
        assert!(!adapter.is_available());
        assert_eq!(adapter.name(), "anthropic");
        assert_eq!(adapter.base_url, "https://api.anthropic.com");
    }
}
