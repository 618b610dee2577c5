//! sw_fetch tool implementation.
//!
//! Routes a page request through the active worker, exactly as an
//! intercepted browser fetch would be. Passing `client_url` registers the
//! issuing page so activation can claim it.

use reflekt_client::{Network, Registration};
use reflekt_core::{AppConfig, Request, RequestMode};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{json_result, resolve_url};

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Path or absolute URL; paths resolve against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode. `navigate` marks a top-level page load.
    #[serde(default)]
    pub mode: RequestMode,

    /// Page issuing the request. Opened as a client if not already open.
    #[serde(default)]
    pub client_url: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// One of `cache`, `network` or `offline_fallback`.
    pub source: String,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    /// Worker that handled the request.
    pub worker: u64,
    /// Id of the issuing page, when `client_url` was given.
    pub client: Option<u64>,
    /// Worker controlling the issuing page.
    pub controller: Option<u64>,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl<N: Network>(
    registration: &Registration<N>, config: &AppConfig, params: SwFetchParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve_url(config, &params.url)?;
    let request = Request::new(url, &params.method, params.mode);

    let client = match params.client_url {
        Some(page) => Some(registration.open_client(resolve_url(config, &page)?).await),
        None => None,
    };

    let outcome = registration.fetch(&request).await?;
    let response = outcome.response;
    let controller = match client {
        Some(id) => registration.clients().controller(id).await,
        None => None,
    };

    json_result(&SwFetchOutput {
        url: response.url.clone(),
        status: response.status,
        content_type: response.content_type.clone(),
        source: outcome.source.as_str().to_string(),
        body: response.text(),
        worker: outcome.worker,
        client: client.map(|id| id.0),
        controller,
    })
}
