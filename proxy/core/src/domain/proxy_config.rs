// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Proxy Configuration
//
// YAML configuration for the proxy process, covering:
// - Listen address
// - Provider credentials (with "env:VAR_NAME" indirection)
// - Upstream base URLs and request timeout
// - Simulated streaming tunables
// - Catalog population mode and per-provider model filters
//
// Environment variables override file values so container deployments can
// run without a config file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::catalog::ProviderId;
use super::filter::ModelFilters;

pub const CONFIG_PATH_ENV: &str = "MODEL_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub backends: BackendsConfig,

    #[serde(default)]
    pub streaming: StreamingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Include/exclude rules used by dynamic catalog population
    #[serde(default)]
    pub model_filters: ModelFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Ollama's default port, so clients need no reconfiguration
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Provider API keys; empty means "not configured"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// Anthropic API key (supports "env:VAR_NAME")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key (supports "env:VAR_NAME")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Client-side timeout for every upstream call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Characters per ndjson fragment
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Pause between fragments
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// Query provider listing endpoints at startup
    #[default]
    Dynamic,
    /// Built-in seed table restricted to configured providers
    Static,
}

impl FromStr for CatalogSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamic" => Ok(CatalogSource::Dynamic),
            "static" => Ok(CatalogSource::Static),
            other => Err(format!("unknown catalog source '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSource,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    11434
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_chunk_size() -> usize {
    3
}

fn default_delay_ms() -> u64 {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            anthropic_base_url: default_anthropic_base_url(),
            openai_base_url: default_openai_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl StreamingConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl BackendsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Credentials {
    /// Resolved key for a provider, empty when not configured.
    ///
    /// A value written as `env:VAR_NAME` is read from that variable.
    pub fn api_key(&self, provider: ProviderId) -> String {
        let raw = match provider {
            ProviderId::Anthropic => self.anthropic_api_key.as_deref(),
            ProviderId::OpenAI => self.openai_api_key.as_deref(),
        };
        let key = match raw {
            Some(key) => match key.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name).unwrap_or_default(),
                None => key.to_string(),
            },
            None => String::new(),
        };
        key.trim().to_string()
    }

    pub fn has(&self, provider: ProviderId) -> bool {
        !self.api_key(provider).is_empty()
    }

    /// Providers with a non-empty credential
    pub fn configured(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|p| self.has(*p))
            .collect()
    }
}

impl ProxyConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. MODEL_CONFIG_PATH environment variable
    /// 2. ./config.yaml (working directory)
    /// 3. ~/.ollama-bridge/config.yaml (user home)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!("{} points at missing file {:?}, ignoring", CONFIG_PATH_ENV, path);
        }

        let cwd = PathBuf::from("./config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".ollama-bridge").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must load
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(config_path)?
            }
            None => {
                tracing::info!("No configuration file found, using defaults and environment");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup; empty values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.credentials.anthropic_api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.credentials.openai_api_key = Some(key);
        }
        if let Some(val) = get("STREAMING_CHUNK_SIZE") {
            match val.trim().parse() {
                Ok(size) => self.streaming.chunk_size = size,
                Err(_) => tracing::warn!("Invalid value for STREAMING_CHUNK_SIZE: '{}'. Ignoring.", val),
            }
        }
        if let Some(val) = get("STREAMING_DELAY_MS") {
            match val.trim().parse() {
                Ok(delay) => self.streaming.delay_ms = delay,
                Err(_) => tracing::warn!("Invalid value for STREAMING_DELAY_MS: '{}'. Ignoring.", val),
            }
        }
        if let Some(val) = get("REQUEST_TIMEOUT_SECS") {
            match val.trim().parse() {
                Ok(secs) => self.backends.request_timeout_secs = secs,
                Err(_) => tracing::warn!("Invalid value for REQUEST_TIMEOUT_SECS: '{}'. Ignoring.", val),
            }
        }
        if let Some(val) = get("CATALOG_SOURCE") {
            match val.parse() {
                Ok(source) => {
                    tracing::info!("Environment override: CATALOG_SOURCE={}", val);
                    self.catalog.source = source;
                }
                Err(e) => tracing::warn!("Invalid value for CATALOG_SOURCE: {}. Ignoring.", e),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.credentials.configured().is_empty() {
            anyhow::bail!("At least one API key must be provided (ANTHROPIC_API_KEY or OPENAI_API_KEY)");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be specified");
        }

        if self.streaming.chunk_size == 0 {
            anyhow::bail!("streaming.chunk_size must be greater than zero");
        }

        if self.backends.request_timeout_secs == 0 {
            anyhow::bail!("backends.request_timeout_secs must be greater than zero");
        }

        for provider in ProviderId::ALL {
            self.model_filters
                .for_provider(provider)
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid model filter pattern for {}: {}", provider, e))?;
        }

        Ok(())
    }
}
