// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # ollama-bridge
//!
//! Runs an Ollama-compatible HTTP server on port 11434 and forwards every
//! request to Anthropic or OpenAI. IDE plugins that only speak Ollama can
//! then use cloud models without any change on their side.
//!
//! ## Commands
//!
//! - `ollama-bridge [serve]` - Run the proxy (default)
//! - `ollama-bridge models` - Print the model catalog the server would use
//! - `ollama-bridge config show|validate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use ollama_bridge::commands::{self, ConfigCommand, ModelsArgs};
use ollama_bridge::server;

/// Ollama-compatible proxy for Anthropic and OpenAI models
#[derive(Parser)]
#[command(name = "ollama-bridge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery, must exist).
    /// MODEL_CONFIG_PATH is honored by discovery and skipped when missing.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address (default: 0.0.0.0)
    #[arg(long, global = true, env = "BIND_HOST")]
    host: Option<String>,

    /// Listen port (default: 11434)
    #[arg(long, global = true, env = "PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the proxy server
    #[command(name = "serve")]
    Serve,

    /// List the models the proxy would serve
    #[command(name = "models")]
    Models {
        #[command(flatten)]
        args: ModelsArgs,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Models { args }) => {
            let config = server::load_config(cli.config, cli.host, cli.port)?;
            commands::models::execute(args, config).await
        }
        Some(Commands::Serve) | None => {
            info!("Starting ollama-bridge {}", env!("CARGO_PKG_VERSION"));
            let config = server::load_config(cli.config, cli.host, cli.port)?;
            server::start_server(config).await
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::domain::proxy_config::CONFIG_PATH_ENV;

    #[test]
    fn test_config_env_left_to_discovery() {
        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/ollama-bridge/config.yaml");

        let cli = Cli::try_parse_from(["ollama-bridge", "config", "show"]).unwrap();
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["ollama-bridge", "--config", "bridge.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bridge.yaml")));
        assert!(cli.command.is_none());
    }
}
