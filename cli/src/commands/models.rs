// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `models` command: populate the catalog as `serve` would and print it

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bridge_core::domain::catalog::{ModelEntry, ProviderId};
use bridge_core::domain::proxy_config::{CatalogSource, ProxyConfig};

use crate::server::build_service;

#[derive(Args, Debug, Default)]
pub struct ModelsArgs {
    /// Only list models served by this provider (anthropic, openai)
    #[arg(long)]
    pub provider: Option<ProviderId>,

    /// Use the built-in model table instead of querying providers
    #[arg(long = "static")]
    pub static_catalog: bool,
}

pub async fn execute(args: ModelsArgs, mut config: ProxyConfig) -> Result<()> {
    if args.static_catalog {
        config.catalog.source = CatalogSource::Static;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    let service = build_service(&config).await?;
    let catalog = service.catalog().read();

    let providers: Vec<ProviderId> = match args.provider {
        Some(provider) => vec![provider],
        None => ProviderId::ALL.to_vec(),
    };

    for provider in providers {
        let mut entries = catalog.list_by_provider(provider);
        if entries.is_empty() {
            continue;
        }
        entries.sort_by(|a, b| a.public_name.cmp(&b.public_name));

        println!("{} ({})", provider.to_string().bold(), entries.len());
        for entry in entries {
            println!("{}", format_entry(entry));
        }
        println!();
    }

    Ok(())
}

fn format_entry(entry: &ModelEntry) -> String {
    format!(
        "  {:<32} {:<36} {:>9} tokens  {}",
        entry.public_name,
        entry.provider_model_id.dimmed(),
        entry.context_window,
        entry.display_name
    )
}
