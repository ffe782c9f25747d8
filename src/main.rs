use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vcfrange::{
    Config, VariantDataSource,
    handlers::{AppState, create_router},
    storage::LocalStorage,
    types::SourceInfo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (source, info) = open_source(&config).await?;
    let state = AppState { source, info };

    let app = create_router(state);
    let app = if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting vcfrange server on {}", addr);
    tracing::info!("Public URL: {}", config.effective_base_url());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_source(config: &Config) -> anyhow::Result<(VariantDataSource, SourceInfo)> {
    let info = |kind, location: String| SourceInfo {
        kind,
        location,
        max_range_width: config.max_range_width,
    };

    if let Some(path) = &config.vcf {
        let storage = LocalStorage::new(path.clone());
        if !storage.path().exists() {
            anyhow::bail!("VCF file not found: {}", path.display());
        }
        tracing::info!("Serving VCF {:?} (indexed: {})", path, storage.has_index());
        let source = VariantDataSource::from_storage(Arc::new(storage))?;
        return Ok((source, info("vcf", path.display().to_string())));
    }

    if let Some(path) = &config.json {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = VariantDataSource::from_json(&json)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        return Ok((source, info("json", path.display().to_string())));
    }

    if let Some(url) = &config.remote {
        return open_remote(config, url).map(|source| (source, info("remote", url.clone())));
    }

    anyhow::bail!("one of --vcf, --json or --remote is required")
}

#[cfg(feature = "http")]
fn open_remote(config: &Config, url: &str) -> anyhow::Result<VariantDataSource> {
    let storage = vcfrange::storage::HttpStorage::new(
        url,
        std::time::Duration::from_secs(config.remote_timeout),
    )?;
    tracing::info!("Proxying variant service at {}", url);
    Ok(VariantDataSource::from_storage(Arc::new(storage))?)
}

#[cfg(not(feature = "http"))]
fn open_remote(_config: &Config, _url: &str) -> anyhow::Result<VariantDataSource> {
    anyhow::bail!("--remote requires the `http` feature")
}
