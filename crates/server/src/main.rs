//! sitebrief MCP server entry point.
//!
//! Loads configuration, opens the audit cache, and serves the tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sitebrief_client::AuditPipeline;
use sitebrief_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let cache = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open cache at {}", config.db_path.display()))?;

    match cache.evict_expired().await {
        Ok(evicted) => tracing::debug!(evicted, "evicted expired cache entries"),
        Err(e) => tracing::warn!(error = %e, "failed to evict expired cache entries"),
    }

    let pipeline = AuditPipeline::from_config(&config, cache.clone()).context("failed to build audit pipeline")?;

    tracing::info!(db_path = %config.db_path.display(), "Starting sitebrief server on stdio transport");

    let handler = handler::SitebriefServer::new(pipeline, cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
