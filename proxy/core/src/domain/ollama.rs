// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama Wire Schema
//
// Request and response bodies of the Ollama HTTP API as IDE plugins send and
// parse them. Field names must stay byte-compatible with Ollama.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::catalog::ModelEntry;
use super::llm::{ChatMessage, SamplingOptions};

/// Placeholder size reported for every model (1 GB)
pub const PLACEHOLDER_MODEL_SIZE: u64 = 1_000_000_000;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// `POST /api/generate` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, Value>>,
}

/// `POST /api/chat` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, Value>>,
}

impl GenerateRequest {
    pub fn sampling_options(&self) -> SamplingOptions {
        sampling_options(self.options.as_ref())
    }
}

impl ChatRequest {
    pub fn sampling_options(&self) -> SamplingOptions {
        sampling_options(self.options.as_ref())
    }
}

fn sampling_options(options: Option<&HashMap<String, Value>>) -> SamplingOptions {
    let Some(options) = options else {
        return SamplingOptions::default();
    };

    let temperature = options
        .get("temperature")
        .and_then(Value::as_f64)
        .map(|t| t as f32);
    let stop = match options.get("stop") {
        Some(Value::String(s)) => Some(vec![s.clone()]),
        Some(Value::Array(items)) => {
            let stops: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            (!stops.is_empty()).then_some(stops)
        }
        _ => None,
    };

    SamplingOptions { temperature, stop }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub model: String,
    pub created_at: String,
    pub response: String,
    pub done: bool,
    pub context: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub created_at: String,
    pub message: ChatMessage,
    pub done: bool,
    pub context: Vec<i64>,
}

/// Which endpoint a reply belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Generate,
    Chat,
}

/// Reply of either endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OllamaReply {
    Generate(GenerateResponse),
    Chat(ChatResponse),
}

impl OllamaReply {
    /// Reply of the given kind with assistant content
    pub fn new(kind: ReplyKind, model: &str, created_at: &str, content: &str, done: bool) -> Self {
        match kind {
            ReplyKind::Generate => OllamaReply::Generate(GenerateResponse {
                model: model.to_string(),
                created_at: created_at.to_string(),
                response: content.to_string(),
                done,
                context: Vec::new(),
            }),
            ReplyKind::Chat => OllamaReply::Chat(ChatResponse {
                model: model.to_string(),
                created_at: created_at.to_string(),
                message: ChatMessage::new("assistant", content),
                done,
                context: Vec::new(),
            }),
        }
    }

    pub fn kind(&self) -> ReplyKind {
        match self {
            OllamaReply::Generate(_) => ReplyKind::Generate,
            OllamaReply::Chat(_) => ReplyKind::Chat,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            OllamaReply::Generate(r) => &r.model,
            OllamaReply::Chat(r) => &r.model,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            OllamaReply::Generate(r) => &r.created_at,
            OllamaReply::Chat(r) => &r.created_at,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            OllamaReply::Generate(r) => &r.response,
            OllamaReply::Chat(r) => &r.message.content,
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            OllamaReply::Generate(r) => r.done,
            OllamaReply::Chat(r) => r.done,
        }
    }
}

/// One element of `/api/tags`, also returned by `/api/show`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub model: String,
    pub modified_at: String,
    pub size: u64,
    pub digest: String,
}

impl ModelSummary {
    pub fn from_entry(entry: &ModelEntry, modified_at: DateTime<Utc>) -> Self {
        Self {
            name: entry.public_name.clone(),
            model: entry.public_name.clone(),
            modified_at: format_timestamp(modified_at),
            size: PLACEHOLDER_MODEL_SIZE,
            digest: format!("sha256:{}", entry.public_name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    pub models: Vec<ModelSummary>,
}

/// `POST /api/show` body; Ollama clients send either field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ShowRequest {
    pub fn model_name(&self) -> Option<&str> {
        self.model
            .as_deref()
            .or(self.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
