// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Proxy HTTP server bootstrap

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use bridge_core::{
    application::{catalog_loader, ProxyService, StreamingEmitter},
    domain::proxy_config::ProxyConfig,
    infrastructure::llm::BackendRegistry,
    presentation::{app, AppState},
};

/// Resolve configuration: file (explicit or discovered), then environment,
/// then command-line listen address.
pub fn load_config(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ProxyConfig> {
    let mut config =
        ProxyConfig::load_or_default(config_path).context("Failed to load configuration")?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    Ok(config)
}

/// Register backends and populate the catalog the same way `serve` does
pub async fn build_service(config: &ProxyConfig) -> Result<ProxyService> {
    let registry =
        BackendRegistry::from_config(config).context("Failed to initialize backends")?;
    let catalog = catalog_loader::load(config, &registry)
        .await
        .context("Failed to populate model catalog")?;

    Ok(ProxyService::new(catalog, registry))
}

pub async fn start_server(config: ProxyConfig) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let service = build_service(&config).await?;
    info!(
        "Available backends: {:?}",
        service.registry().list_available()
    );
    info!("Total models: {}", service.catalog().read().len());

    let emitter = StreamingEmitter::from_config(&config.streaming);
    let router = app(AppState::new(service, emitter));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Ollama bridge listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::domain::catalog::ProviderId;
    use bridge_core::domain::proxy_config::CatalogSource;
    use std::io::Write;

    fn config_file(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_address_overrides_file() {
        let file = config_file("server:\n  host: 127.0.0.1\n  port: 9000\n");

        let config = load_config(Some(file.path().to_path_buf()), None, None).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);

        let config = load_config(
            Some(file.path().to_path_buf()),
            Some("::1".to_string()),
            Some(11435),
        )
        .unwrap();
        assert_eq!(config.server.host, "::1");
        assert_eq!(config.server.port, 11435);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let err = load_config(Some(PathBuf::from("/nonexistent/bridge.yaml")), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }

    #[test]
    fn test_missing_env_config_path_is_not_fatal() {
        std::env::set_var(
            bridge_core::domain::proxy_config::CONFIG_PATH_ENV,
            "/nonexistent/ollama-bridge/config.yaml",
        );

        let config = load_config(None, None, Some(11500)).unwrap();
        assert_eq!(config.server.port, 11500);
    }

    #[tokio::test]
    async fn test_build_service_with_static_catalog() {
        let file = config_file(
            "credentials:\n  anthropic_api_key: sk-ant-test\ncatalog:\n  source: static\n",
        );
        let mut config = load_config(Some(file.path().to_path_buf()), None, None).unwrap();
        // Keep the environment from adding a second backend
        config.credentials.openai_api_key = None;
        config.catalog.source = CatalogSource::Static;

        let service = build_service(&config).await.unwrap();
        assert_eq!(service.registry().list_available(), vec![ProviderId::Anthropic]);
        assert_eq!(service.catalog().read().len(), 3);
    }
}
