//! MCP tool implementations.
//!
//! This module contains all tools exposed by the reflekt-sw server.

pub mod cache;
pub mod sw;
pub mod tab_swipe;

#[cfg(test)]
pub(crate) mod testing;

use reflekt_client::fetch::resolve;
use reflekt_client::{Network, Registration};
use reflekt_core::{AppConfig, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use url::Url;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Resolve a path or absolute URL against the configured origin.
pub(crate) fn resolve_url(config: &AppConfig, input: &str) -> Result<Url, Error> {
    let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
    resolve(&origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
}

/// Cache store of the active worker, or the configured one before the first install.
pub(crate) async fn current_cache<N: Network>(registration: &Registration<N>, config: &AppConfig) -> String {
    match registration.active().await {
        Some(worker) => worker.cache_name().to_string(),
        None => config.cache_name.clone(),
    }
}
