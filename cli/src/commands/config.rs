// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use bridge_core::domain::catalog::ProviderId;
use bridge_core::domain::filter::FilterRule;
use bridge_core::domain::proxy_config::{ProxyConfig, CONFIG_PATH_ENV};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML (API keys masked)
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

/// Keep enough of a key to tell keys apart without revealing it
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    if key.chars().count() <= 10 {
        return "****".to_string();
    }
    let visible: String = key.chars().take(6).collect();
    format!("{}****", visible)
}

fn masked(config: &ProxyConfig) -> ProxyConfig {
    let mut config = config.clone();
    for provider in ProviderId::ALL {
        let key = config.credentials.api_key(provider);
        let slot = match provider {
            ProviderId::Anthropic => &mut config.credentials.anthropic_api_key,
            ProviderId::OpenAI => &mut config.credentials.openai_api_key,
        };
        *slot = (!key.is_empty()).then(|| mask_key(&key));
    }
    config
}

fn describe_rule(rule: &FilterRule) -> String {
    if !rule.enabled {
        return "disabled".dimmed().to_string();
    }
    let include = if rule.include_patterns.is_empty() {
        "*".to_string()
    } else {
        rule.include_patterns.join(", ")
    };
    let mut text = format!("include [{}]", include);
    if !rule.exclude_patterns.is_empty() {
        text.push_str(&format!(", exclude [{}]", rule.exclude_patterns.join(", ")));
    }
    text
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = ProxyConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./config.yaml");
        println!("  4. ~/.ollama-bridge/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&masked(&config)).context("Failed to render configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!();

    println!("{}", "Backends:".bold());
    for provider in ProviderId::ALL {
        let key = config.credentials.api_key(provider);
        let base_url = match provider {
            ProviderId::Anthropic => &config.backends.anthropic_base_url,
            ProviderId::OpenAI => &config.backends.openai_base_url,
        };
        let status = if key.is_empty() {
            "not configured".yellow()
        } else {
            "configured".green()
        };
        println!("  {} ({})", provider.to_string().bold(), status);
        println!("    Endpoint: {}", base_url);
        println!("    API key: {}", mask_key(&key));
        println!(
            "    Model filter: {}",
            describe_rule(config.model_filters.for_provider(provider))
        );
    }
    println!(
        "  Request timeout: {}s",
        config.backends.request_timeout_secs
    );
    println!();

    println!("{}", "Catalog:".bold());
    println!("  Source: {:?}", config.catalog.source);
    println!();

    println!("{}", "Streaming:".bold());
    println!("  Chunk size: {} characters", config.streaming.chunk_size);
    println!("  Delay: {}ms", config.streaming.delay_ms);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = ProxyConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "(not set)");
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("sk-ant-api03-abcdef"), "sk-ant****");
    }

    #[test]
    fn test_masked_config_hides_keys() {
        let mut config = ProxyConfig::default();
        config.credentials.openai_api_key = Some("sk-proj-1234567890".to_string());

        let shown = masked(&config);
        assert_eq!(shown.credentials.openai_api_key.as_deref(), Some("sk-pro****"));
        assert_eq!(shown.credentials.anthropic_api_key, None);

        let yaml = serde_yaml::to_string(&shown).unwrap();
        assert!(!yaml.contains("1234567890"));
    }

    #[test]
    fn test_describe_rule() {
        colored::control::set_override(false);
        assert_eq!(describe_rule(&FilterRule::default()), "include [*]");

        let rule = FilterRule {
            enabled: true,
            include_patterns: vec!["gpt-*".to_string()],
            exclude_patterns: vec!["*-mini".to_string()],
        };
        assert_eq!(describe_rule(&rule), "include [gpt-*], exclude [*-mini]");
    }
}
