//! sw_close_client tool implementation.
//!
//! Pages are opened implicitly by `sw_fetch` with a `client_url`; this tool
//! closes them again.

use reflekt_client::{Network, Registration};
use reflekt_core::AppConfig;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{json_result, resolve_url};

/// Parameters for the sw_close_client tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwCloseClientParams {
    /// URL of the page to close.
    pub client_url: String,
}

/// Output from the sw_close_client tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwCloseClientOutput {
    /// False when no page was open at that URL.
    pub closed: bool,
    /// Pages still open.
    pub clients: usize,
}

/// Implementation of the sw_close_client tool.
pub async fn close_client_impl<N: Network>(
    registration: &Registration<N>, config: &AppConfig, params: SwCloseClientParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve_url(config, &params.client_url)?;
    let closed = registration.close_client(&url).await;

    json_result(&SwCloseClientOutput { closed, clients: registration.clients().len().await })
}
