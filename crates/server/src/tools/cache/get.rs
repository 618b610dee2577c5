//! cache_get tool implementation.
//!
//! Lists a cache store, or reads one entry from it by URL.

use reflekt_client::{Network, Registration};
use reflekt_core::{AppConfig, CachedEntry, Error, Request};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{current_cache, json_result, resolve_url};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Entry to read. Omit to list the whole store.
    #[serde(default)]
    pub url: Option<String>,

    /// Store to read from. Defaults to the active worker's store.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub cache_name: String,
    /// Matching entries, without bodies.
    pub entries: Vec<CachedEntry>,
    /// Body of the requested entry, when `url` was given.
    pub body: Option<String>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<N: Network>(
    registration: &Registration<N>, config: &AppConfig, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let cache_name = match params.cache_name {
        Some(name) => name,
        None => current_cache(registration, config).await,
    };
    let db = registration.db();
    let entries = db.entries(&cache_name).await?;

    let Some(url) = params.url else {
        return json_result(&CacheGetOutput { cache_name, entries, body: None });
    };

    let url = resolve_url(config, &url)?;
    let response = db
        .match_request(&cache_name, &Request::get(url.clone()))
        .await?
        .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    let entries = entries.into_iter().filter(|e| e.url == url.as_str()).collect();
    json_result(&CacheGetOutput { cache_name, entries, body: Some(response.text()) })
}
