//! sw_status tool implementation.

use reflekt_client::{Network, Registration, WorkerState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// The active worker as reported by sw_status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActiveWorkerOutput {
    pub worker: u64,
    pub cache_name: String,
    pub state: String,
    pub skip_waiting: bool,
    pub cached_entries: u64,
}

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwStatusOutput {
    /// `None` until the first successful install.
    pub active: Option<ActiveWorkerOutput>,
    /// Every cache store present in the database.
    pub cache_names: Vec<String>,
    /// Number of open pages.
    pub clients: usize,
}

fn state_name(state: WorkerState) -> &'static str {
    match state {
        WorkerState::Parsed => "parsed",
        WorkerState::Installing => "installing",
        WorkerState::Installed => "installed",
        WorkerState::Activating => "activating",
        WorkerState::Activated => "activated",
        WorkerState::Redundant => "redundant",
    }
}

/// Implementation of the sw_status tool.
pub async fn status_impl<N: Network>(registration: &Registration<N>) -> Result<CallToolResult, McpError> {
    let active = registration.status().await?.map(|a| ActiveWorkerOutput {
        worker: a.worker,
        cache_name: a.cache_name,
        state: state_name(a.state).to_string(),
        skip_waiting: a.skip_waiting,
        cached_entries: a.cached_entries,
    });

    json_result(&SwStatusOutput {
        active,
        cache_names: registration.db().cache_names().await?,
        clients: registration.clients().len().await,
    })
}
