//! policy-desk server entry point.
//!
//! Boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use desk_client::{FetchClient, FetchConfig, PdfExtractor, PolicyService};
use desk_core::{AppConfig, CacheDb, Catalog, SearchEngine};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let service = build_service(&config).await?;

    tracing::info!(
        db_path = %config.db_path.display(),
        categories = service.catalog().len(),
        retention = config.retention_max_age_secs.map_or("never-expire", |_| "max-age"),
        "Starting policy-desk server on stdio transport"
    );

    let handler = handler::PolicyDeskServer::new(Arc::new(service));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

async fn build_service(config: &AppConfig) -> Result<PolicyService> {
    let catalog = Catalog::from_config(config)?;
    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = FetchClient::new(FetchConfig::from(config))?;

    let service = PolicyService::new(db, catalog, Arc::new(fetcher), Arc::new(PdfExtractor::new()))
        .with_retention(config.retention_policy())
        .with_search(SearchEngine::new(config.search_index, config.snippet_chars))
        .with_extension(config.document_extension.clone());

    let indexed = service.warm_search().await?;
    tracing::debug!(indexed, "search ready");

    Ok(service)
}
