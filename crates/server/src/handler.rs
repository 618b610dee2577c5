//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::sw::{
    SwCloseClientParams, SwFetchParams, SwInstallParams, close_client_impl, fetch_impl, install_impl, status_impl,
};
use crate::tools::tab_swipe::{TabSwipeParams, swipe_impl};

use reflekt_client::{FetchClient, Registration};
use reflekt_core::AppConfig;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for reflekt-sw.
#[derive(Clone)]
pub struct ReflektServer {
    config: Arc<AppConfig>,
    registration: Arc<Registration<FetchClient>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ReflektServer {
    /// Create a new server handler.
    pub fn new(config: AppConfig, registration: Arc<Registration<FetchClient>>) -> Self {
        Self { config: Arc::new(config), registration, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Install and activate the offline cache worker. Precaches every app shell asset atomically; pass a new cache_name to bump the cache version."
    )]
    async fn sw_install(&self, params: Parameters<SwInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(&self.registration, &self.config, params.0).await
    }

    #[tool(description = "Report the active worker, its cache store and the stores present on disk.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.registration).await
    }

    /// Route a request through the active worker.
    ///
    /// Navigations are network-first with the offline page as fallback; other
    /// requests are cache-first.
    #[tool(
        description = "Fetch a URL through the offline cache worker. Returns status, body and whether it came from cache, network or the offline fallback. Pass client_url to register the issuing page."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.registration, &self.config, params.0).await
    }

    #[tool(description = "Close the page at client_url so the worker no longer controls it.")]
    async fn sw_close_client(&self, params: Parameters<SwCloseClientParams>) -> Result<CallToolResult, McpError> {
        close_client_impl(&self.registration, &self.config, params.0).await
    }

    #[tool(description = "List a cache store, or read one cached entry by URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.registration, &self.config, params.0).await
    }

    #[tool(
        description = "Delete a cache store by name, or every store except the active one. The active store cannot be deleted."
    )]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.registration, &self.config, params.0).await
    }

    /// Classify a touch sequence on a page.
    ///
    /// No network requests are made.
    #[tool(
        description = "Replay a touch gesture on a page. Returns the tab URL a horizontal swipe would navigate to, or null."
    )]
    async fn tab_swipe(&self, params: Parameters<TabSwipeParams>) -> Result<CallToolResult, McpError> {
        swipe_impl(&self.config, params.0).await
    }
}

impl ServerHandler for ReflektServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "reflekt-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
