//! reflekt-sw entry point.
//!
//! Boots the offline cache worker for the configured origin and serves it
//! over MCP on stdio. Logging goes to stderr to keep stdout free for JSON-RPC.

use std::sync::Arc;

use anyhow::Result;
use reflekt_client::{FetchClient, FetchConfig, Registration, WorkerConfig};
use reflekt_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
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

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, cache = %config.cache_name, "Starting reflekt-sw on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let registration = Arc::new(Registration::new(db, network));

    let worker_config = WorkerConfig::from_app(&config)?;
    if !registration.resume(worker_config.clone()).await? {
        match registration.update(worker_config).await {
            Ok(update) => tracing::info!(worker = update.worker, cache = %update.cache_name, "worker installed"),
            Err(e) => tracing::warn!(error = %e, "initial install failed, retry with sw_install"),
        }
    }

    let handler = handler::ReflektServer::new(config, registration);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
