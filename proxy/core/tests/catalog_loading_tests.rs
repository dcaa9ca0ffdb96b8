// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog population against mocked provider listing endpoints.
//!
//! Builds the registry from a `ProxyConfig` whose base URLs point at mockito
//! servers, so the real Anthropic and OpenAI adapters are exercised.

use bridge_core::application::catalog_loader::{self, CatalogError};
use bridge_core::domain::catalog::ProviderId;
use bridge_core::domain::proxy_config::{CatalogSource, ProxyConfig};
use bridge_core::infrastructure::llm::BackendRegistry;
use mockito::Matcher;
use serde_json::json;

fn config_for(anthropic: &mockito::ServerGuard, openai: &mockito::ServerGuard) -> ProxyConfig {
    let yaml = format!(
        r#"
credentials:
  anthropic_api_key: sk-ant-test
  openai_api_key: sk-test
backends:
  anthropic_base_url: {}
  openai_base_url: {}
  request_timeout_secs: 5
model_filters:
  openai:
    include_patterns: ["gpt-*"]
    exclude_patterns: ["*-instruct", "gpt-4o-audio-*"]
"#,
        anthropic.url(),
        openai.url()
    );
    ProxyConfig::from_yaml_str(&yaml).unwrap()
}

async fn mock_anthropic_listing(server: &mut mockito::ServerGuard, status: usize) -> mockito::Mock {
    server
        .mock("GET", "/v1/models")
        .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
        .match_header("x-api-key", "sk-ant-test")
        .with_status(status)
        .with_body(
            json!({
                "data": [
                    {"type": "model", "id": "claude-3-5-sonnet-20241022", "display_name": "Claude 3.5 Sonnet (New)"},
                    {"type": "model", "id": "claude-3-haiku-20240307", "display_name": "Claude 3 Haiku"}
                ],
                "has_more": false
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_openai_listing(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/models")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    {"id": "gpt-4o", "object": "model"},
                    {"id": "gpt-3.5-turbo-instruct", "object": "model"},
                    {"id": "gpt-4o-audio-preview", "object": "model"},
                    {"id": "text-embedding-3-small", "object": "model"},
                    {"id": "gpt-4.1", "object": "model"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_dynamic_catalog_from_both_providers() {
    let mut anthropic = mockito::Server::new_async().await;
    let mut openai = mockito::Server::new_async().await;
    let anthropic_mock = mock_anthropic_listing(&mut anthropic, 200).await;
    let openai_mock = mock_openai_listing(&mut openai).await;

    let config = config_for(&anthropic, &openai);
    let registry = BackendRegistry::from_config(&config).unwrap();
    let catalog = catalog_loader::load(&config, &registry).await.unwrap();

    anthropic_mock.assert_async().await;
    openai_mock.assert_async().await;

    let mut names: Vec<&str> = catalog
        .list_enabled()
        .iter()
        .map(|e| e.public_name.as_str())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["claude-3-haiku", "claude-3.5-sonnet", "gpt-4.1", "gpt-4o"]
    );

    let sonnet = catalog.lookup("claude-3.5-sonnet").unwrap();
    assert_eq!(sonnet.provider, ProviderId::Anthropic);
    assert_eq!(sonnet.provider_model_id, "claude-3-5-sonnet-20241022");
    assert_eq!(sonnet.display_name, "Claude 3.5 Sonnet (New)");
    assert_eq!(sonnet.context_window, 200_000);

    let gpt41 = catalog.lookup("gpt-4.1").unwrap();
    assert_eq!(gpt41.display_name, "GPT-4.1");
    assert_eq!(gpt41.context_window, 1_047_576);
}

#[tokio::test]
async fn test_failing_provider_contributes_nothing() {
    let mut anthropic = mockito::Server::new_async().await;
    let mut openai = mockito::Server::new_async().await;
    mock_anthropic_listing(&mut anthropic, 500).await;
    mock_openai_listing(&mut openai).await;

    let config = config_for(&anthropic, &openai);
    let registry = BackendRegistry::from_config(&config).unwrap();
    let catalog = catalog_loader::load(&config, &registry).await.unwrap();

    assert!(catalog.list_by_provider(ProviderId::Anthropic).is_empty());
    assert_eq!(catalog.list_by_provider(ProviderId::OpenAI).len(), 2);
}

#[tokio::test]
async fn test_no_models_is_fatal() {
    let mut anthropic = mockito::Server::new_async().await;
    let openai = mockito::Server::new_async().await;
    mock_anthropic_listing(&mut anthropic, 401).await;

    let mut config = config_for(&anthropic, &openai);
    config.model_filters.openai.enabled = false;

    let registry = BackendRegistry::from_config(&config).unwrap();
    let err = catalog_loader::load(&config, &registry).await.unwrap_err();
    assert!(matches!(err, CatalogError::Empty));
}

#[tokio::test]
async fn test_static_source_never_calls_listing() {
    let mut anthropic = mockito::Server::new_async().await;
    let openai = mockito::Server::new_async().await;
    let listing = anthropic
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = config_for(&anthropic, &openai);
    config.catalog.source = CatalogSource::Static;
    config.credentials.openai_api_key = None;

    let registry = BackendRegistry::from_config(&config).unwrap();
    let catalog = catalog_loader::load(&config, &registry).await.unwrap();
    listing.assert_async().await;

    assert_eq!(catalog.len(), 3);
    assert!(catalog.list_by_provider(ProviderId::OpenAI).is_empty());
}
