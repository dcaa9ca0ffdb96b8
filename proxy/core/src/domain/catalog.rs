// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Model Catalog
//!
//! Maps the public model names that Ollama clients request onto a backend
//! provider and the provider-specific model id, together with the context
//! window used for token budgeting.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Owns model metadata, the static seed table, and the
//!   naming rules applied to dynamically listed provider models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::llm::ListedModel;

/// Cloud provider backing a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::Anthropic, ProviderId::OpenAI];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenAI => "openai",
        }
    }

    fn vendor(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "Anthropic",
            ProviderId::OpenAI => "OpenAI",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderId::Anthropic),
            "openai" => Ok(ProviderId::OpenAI),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// One published model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Name clients send in the `model` field (unique key)
    pub public_name: String,

    pub display_name: String,

    pub provider: ProviderId,

    /// Id understood by the provider API
    pub provider_model_id: String,

    /// e.g. "claude", "gpt"
    pub family: String,

    pub description: String,

    /// Maximum combined input and output tokens
    pub context_window: u32,

    pub enabled: bool,
}

impl ModelEntry {
    /// Synthesize an entry from a provider listing
    pub fn from_listing(provider: ProviderId, listed: &ListedModel) -> Self {
        let id = listed.id.as_str();
        let display_name = match (provider, listed.display_name.as_deref()) {
            (ProviderId::Anthropic, Some(name)) if !name.trim().is_empty() => name.to_string(),
            _ => display_name_for(provider, id),
        };
        let description = match listed.description.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => format!("{} {} model", provider.vendor(), display_name),
        };
        let context_window = match listed.context_window {
            Some(window) if window > 0 => window,
            _ => context_window_for(provider, id),
        };

        Self {
            public_name: public_name_for(provider, id),
            display_name,
            provider,
            provider_model_id: id.to_string(),
            family: family_of(id),
            description,
            context_window,
            enabled: true,
        }
    }
}

struct SeedModel {
    public_name: &'static str,
    display_name: &'static str,
    provider: ProviderId,
    provider_model_id: &'static str,
    description: &'static str,
    context_window: u32,
}

const SEED_MODELS: &[SeedModel] = &[
    SeedModel {
        public_name: "claude-3.5-sonnet",
        display_name: "Claude 3.5 Sonnet",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-5-sonnet-20241022",
        description: "Most capable model for complex tasks",
        context_window: 200_000,
    },
    SeedModel {
        public_name: "claude-3.5-haiku",
        display_name: "Claude 3.5 Haiku",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-5-haiku-20241022",
        description: "Fast and efficient model",
        context_window: 200_000,
    },
    SeedModel {
        public_name: "claude-3-opus",
        display_name: "Claude 3 Opus",
        provider: ProviderId::Anthropic,
        provider_model_id: "claude-3-opus-20240229",
        description: "Most powerful model for complex reasoning",
        context_window: 200_000,
    },
    SeedModel {
        public_name: "gpt-4o",
        display_name: "GPT-4o",
        provider: ProviderId::OpenAI,
        provider_model_id: "gpt-4o",
        description: "Most capable GPT-4 model",
        context_window: 128_000,
    },
    SeedModel {
        public_name: "gpt-4o-mini",
        display_name: "GPT-4o Mini",
        provider: ProviderId::OpenAI,
        provider_model_id: "gpt-4o-mini",
        description: "Faster, cheaper GPT-4 model",
        context_window: 128_000,
    },
    SeedModel {
        public_name: "gpt-4",
        display_name: "GPT-4",
        provider: ProviderId::OpenAI,
        provider_model_id: "gpt-4",
        description: "Classic GPT-4 model",
        context_window: 8_192,
    },
    SeedModel {
        public_name: "gpt-3.5-turbo",
        display_name: "GPT-3.5 Turbo",
        provider: ProviderId::OpenAI,
        provider_model_id: "gpt-3.5-turbo",
        description: "Fast and efficient model",
        context_window: 16_385,
    },
];

impl From<&SeedModel> for ModelEntry {
    fn from(seed: &SeedModel) -> Self {
        Self {
            public_name: seed.public_name.to_string(),
            display_name: seed.display_name.to_string(),
            provider: seed.provider,
            provider_model_id: seed.provider_model_id.to_string(),
            family: family_of(seed.provider_model_id),
            description: seed.description.to_string(),
            context_window: seed.context_window,
            enabled: true,
        }
    }
}

/// Public model name -> model entry
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, ModelEntry>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with every built-in model
    pub fn with_defaults() -> Self {
        Self::with_defaults_for(&ProviderId::ALL)
    }

    /// Built-in models restricted to the given providers
    pub fn with_defaults_for(providers: &[ProviderId]) -> Self {
        let mut catalog = Self::new();
        for seed in SEED_MODELS.iter().filter(|s| providers.contains(&s.provider)) {
            catalog.add(ModelEntry::from(seed));
        }
        catalog
    }

    pub fn lookup(&self, public_name: &str) -> Option<&ModelEntry> {
        self.models.get(public_name)
    }

    /// Every enabled entry, in no particular order
    pub fn list_enabled(&self) -> Vec<&ModelEntry> {
        self.models.values().filter(|m| m.enabled).collect()
    }

    pub fn list_by_provider(&self, provider: ProviderId) -> Vec<&ModelEntry> {
        self.models
            .values()
            .filter(|m| m.enabled && m.provider == provider)
            .collect()
    }

    /// Insert, replacing any entry with the same public name
    pub fn add(&mut self, entry: ModelEntry) {
        self.models.insert(entry.public_name.clone(), entry);
    }

    pub fn remove(&mut self, public_name: &str) {
        self.models.remove(public_name);
    }

    pub fn set_enabled(&mut self, public_name: &str, enabled: bool) {
        if let Some(entry) = self.models.get_mut(public_name) {
            entry.enabled = enabled;
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Public name for a provider model id.
///
/// Anthropic ids lose their trailing date stamp and adjacent version numbers
/// are joined with a dot, so `claude-3-5-sonnet-20241022` is published as
/// `claude-3.5-sonnet`. OpenAI ids are published verbatim.
pub fn public_name_for(provider: ProviderId, provider_model_id: &str) -> String {
    match provider {
        ProviderId::Anthropic => anthropic_segments(provider_model_id).join("-"),
        ProviderId::OpenAI => provider_model_id.to_string(),
    }
}

pub fn display_name_for(provider: ProviderId, provider_model_id: &str) -> String {
    match provider {
        ProviderId::Anthropic => {
            let segments = anthropic_segments(provider_model_id);
            let mut words = vec!["Claude".to_string()];
            words.extend(
                segments
                    .iter()
                    .skip_while(|s| s.as_str() == "claude")
                    .map(|s| title_case(s)),
            );
            words.join(" ")
        }
        ProviderId::OpenAI => provider_model_id.to_uppercase(),
    }
}

/// First hyphen-delimited segment of the provider id
pub fn family_of(provider_model_id: &str) -> String {
    provider_model_id
        .split('-')
        .next()
        .unwrap_or(provider_model_id)
        .to_string()
}

// Ordered: the first matching substring wins.
const CONTEXT_WINDOWS: &[(ProviderId, &str, u32)] = &[
    (ProviderId::Anthropic, "claude-3", 200_000),
    (ProviderId::Anthropic, "claude-sonnet", 200_000),
    (ProviderId::Anthropic, "claude-opus", 200_000),
    (ProviderId::Anthropic, "claude-haiku", 200_000),
    (ProviderId::OpenAI, "gpt-5", 400_000),
    (ProviderId::OpenAI, "gpt-4.1", 1_047_576),
    (ProviderId::OpenAI, "gpt-4o", 128_000),
    (ProviderId::OpenAI, "gpt-4-turbo", 128_000),
    (ProviderId::OpenAI, "gpt-4", 8_192),
    (ProviderId::OpenAI, "gpt-3.5", 4_096),
];

/// Context window guess for providers whose listing omits it
pub fn context_window_for(provider: ProviderId, provider_model_id: &str) -> u32 {
    CONTEXT_WINDOWS
        .iter()
        .find(|(p, needle, _)| *p == provider && provider_model_id.contains(needle))
        .map(|(_, _, window)| *window)
        .unwrap_or(match provider {
            ProviderId::Anthropic => 100_000,
            ProviderId::OpenAI => 4_096,
        })
}

fn anthropic_segments(provider_model_id: &str) -> Vec<String> {
    let mut parts: Vec<&str> = provider_model_id.split('-').collect();
    if parts.len() > 1 {
        if let Some(last) = parts.last() {
            if last.len() == 8 && last.chars().all(|c| c.is_ascii_digit()) {
                parts.pop();
            }
        }
    }

    let mut segments: Vec<String> = Vec::with_capacity(parts.len());
    let mut previous_numeric = false;
    for part in parts {
        let numeric = !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        match segments.last_mut() {
            Some(last) if numeric && previous_numeric => {
                last.push('.');
                last.push_str(part);
            }
            _ => segments.push(part.to_string()),
        }
        previous_numeric = numeric;
    }
    segments
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
