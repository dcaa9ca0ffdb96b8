// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Catalog Loader - Populates the model catalog at startup
//
// Either restricts the seed table to the registered backends, or asks each
// backend's listing endpoint for its models and runs them through the
// configured filter rules.

use crate::domain::catalog::{ModelCatalog, ModelEntry, ProviderId};
use crate::domain::filter::ModelFilters;
use crate::domain::proxy_config::{CatalogSource, ProxyConfig};
use crate::infrastructure::llm::BackendRegistry;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no models available from any backend; check API keys and model filters")]
    Empty,
}

/// Seed table restricted to backends that are registered and available
pub fn load_static(registry: &BackendRegistry) -> ModelCatalog {
    let available = registry.list_available();
    let catalog = ModelCatalog::with_defaults_for(&available);
    info!(
        "Loaded {} models from static catalog for backends {:?}",
        catalog.len(),
        available
    );
    catalog
}

/// Query every enabled backend's model listing and build the catalog from it.
///
/// A backend that fails to list contributes nothing. Fails only when the
/// resulting catalog would be empty.
pub async fn load_dynamic(
    registry: &BackendRegistry,
    filters: &ModelFilters,
) -> Result<ModelCatalog, CatalogError> {
    let mut catalog = ModelCatalog::new();

    for provider in ProviderId::ALL {
        let rule = filters.for_provider(provider);
        if !rule.enabled {
            info!("Model listing disabled for {} by filter rules", provider);
            continue;
        }

        let Some(adapter) = registry.get(provider) else {
            debug!("No backend registered for {}, skipping model listing", provider);
            continue;
        };
        if !adapter.is_available() {
            debug!("Backend {} has no credentials, skipping model listing", provider);
            continue;
        }

        let listed = match adapter.list_models().await {
            Ok(models) => models,
            Err(e) => {
                warn!("Failed to fetch models from {}: {}", provider, e);
                continue;
            }
        };

        // Listings put the newest snapshot first; dated snapshots of one
        // model share a public name, so the first one listed keeps it.
        let before = catalog.len();
        for model in listed.iter().filter(|m| rule.matches(&m.id)) {
            let entry = ModelEntry::from_listing(provider, model);
            if let Some(existing) = catalog.lookup(&entry.public_name) {
                debug!(
                    "{} already published by {}, skipping {}",
                    entry.public_name, existing.provider_model_id, entry.provider_model_id
                );
                continue;
            }
            catalog.add(entry);
        }
        info!(
            "Fetched {} models from {} ({} after filtering)",
            listed.len(),
            provider,
            catalog.len() - before
        );
    }

    if catalog.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(catalog)
}

/// Populate the catalog using the configured source
pub async fn load(config: &ProxyConfig, registry: &BackendRegistry) -> Result<ModelCatalog, CatalogError> {
    match config.catalog.source {
        CatalogSource::Static => Ok(load_static(registry)),
        CatalogSource::Dynamic => load_dynamic(registry, &config.model_filters).await,
    }
}
