//! sw_install tool implementation.
//!
//! Installs a worker for the given cache generation and promotes it to
//! active. Installing under a new cache name is how a deployment bumps the
//! cache version; the previous generation is deleted on activation.

use reflekt_client::{Network, Registration, WorkerConfig};
use reflekt_core::{AppConfig, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the sw_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallParams {
    /// Cache generation to install. Defaults to the configured cache name.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallOutput {
    /// Id of the newly active worker.
    pub worker: u64,
    pub cache_name: String,
    /// Id of the worker it replaced, if any.
    pub replaced: Option<u64>,
    /// Cache generations deleted during activation.
    pub deleted_caches: Vec<String>,
    /// Open pages now controlled by the new worker.
    pub claimed_clients: usize,
}

/// Implementation of the sw_install tool.
pub async fn install_impl<N: Network>(
    registration: &Registration<N>, config: &AppConfig, params: SwInstallParams,
) -> Result<CallToolResult, McpError> {
    let mut app = config.clone();
    if let Some(cache_name) = params.cache_name {
        let cache_name = cache_name.trim();
        if cache_name.is_empty() {
            return Err(Error::InvalidInput("cache_name must not be empty".to_string()).into());
        }
        app.cache_name = cache_name.to_string();
    }

    let update = registration.update(WorkerConfig::from_app(&app)?).await?;

    json_result(&SwInstallOutput {
        worker: update.worker,
        cache_name: update.cache_name,
        replaced: update.replaced,
        deleted_caches: update.activation.deleted_caches,
        claimed_clients: update.activation.claimed_clients,
    })
}
