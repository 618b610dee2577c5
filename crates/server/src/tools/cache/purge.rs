//! cache_purge tool implementation.
//!
//! Deletes one cache store by name, or every store except the current one.
//! The store of the active worker is never deleted.

use reflekt_client::{Network, Registration};
use reflekt_core::{AppConfig, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{current_cache, json_result};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete this store. Must not be the active worker's store.
    #[serde(default)]
    pub cache_name: Option<String>,

    /// Delete every store except the active worker's.
    #[serde(default)]
    pub stale: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Names of the deleted stores.
    pub deleted: Vec<String>,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl<N: Network>(
    registration: &Registration<N>, config: &AppConfig, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    if params.cache_name.is_none() && !params.stale {
        return Err(Error::InvalidInput("One of cache_name or stale must be specified".to_string()).into());
    }

    let db = registration.db();
    let keep = current_cache(registration, config).await;
    let mut deleted = Vec::new();

    if let Some(name) = params.cache_name {
        if name == keep {
            return Err(Error::InvalidInput(format!("{name} is the current cache store")).into());
        }
        if db.delete_cache(&name).await? {
            deleted.push(name);
        }
    }

    if params.stale {
        for name in db.delete_caches_except(&keep).await? {
            if !deleted.contains(&name) {
                deleted.push(name);
            }
        }
    }

    tracing::info!(?deleted, "purged cache stores");
    json_result(&CachePurgeOutput { deleted })
}
