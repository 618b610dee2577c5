//! tab_swipe tool implementation.
//!
//! Replays one touch sequence against a page and reports the tab the
//! navigator would switch to. No network I/O is performed; the page HTML is
//! provided by the caller.

use reflekt_client::{GestureNavigator, TabList, TouchPoint, TouchTarget};
use reflekt_core::{AppConfig, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{json_result, resolve_url};

/// A touch position in CSS pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for TouchPoint {
    fn from(p: Point) -> Self {
        TouchPoint::new(p.x, p.y)
    }
}

/// Parameters for the tab_swipe tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabSwipeParams {
    /// Current page; paths resolve against the configured origin.
    pub page_url: String,

    /// Page HTML used to discover tabs and the touched element.
    /// Without it the configured fallback tabs are used.
    #[serde(default)]
    pub html: Option<String>,

    /// Where the first finger touched down.
    pub start: Point,

    /// Where it lifted.
    pub end: Point,

    /// CSS selector of the element the touch started on.
    #[serde(default)]
    pub target: Option<String>,

    /// Overrides the configured tab anchor selector.
    #[serde(default)]
    pub nav_selector: Option<String>,
}

/// Output from the tab_swipe tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabSwipeOutput {
    /// URL to navigate to; `None` when the touch was not a tab swipe.
    pub navigate_to: Option<String>,
    /// Tabs in page order.
    pub tabs: Vec<String>,
    /// Position of the current page among the tabs.
    pub current_index: Option<usize>,
    /// Whether the touch started on an interactive element.
    pub interactive_target: bool,
}

/// Implementation of the tab_swipe tool.
pub async fn swipe_impl(config: &AppConfig, params: TabSwipeParams) -> Result<CallToolResult, McpError> {
    let page_url = resolve_url(config, &params.page_url)?;
    let html = params.html.unwrap_or_default();
    let selector = params.nav_selector.as_deref().unwrap_or(&config.nav_selector);

    let tabs = TabList::from_html(&html, &page_url, selector, &config.fallback_tabs)?;
    let target = match params.target.as_deref() {
        Some(selector) => TouchTarget::find(&html, selector)
            .ok_or_else(|| Error::InvalidInput(format!("no element matches target {selector}")))?,
        None => TouchTarget::default(),
    };

    let current_index = tabs.index_of(&page_url);
    let tab_urls = tabs
        .tabs()
        .iter()
        .map(|tab| tab.url.as_ref().map_or_else(|| tab.href.clone(), |url| url.to_string()))
        .collect();

    let mut navigator = GestureNavigator::new(tabs, page_url, config.swipe.clone());
    let navigate_to = navigator.swipe(params.start.into(), params.end.into(), &target);

    json_result(&TabSwipeOutput {
        navigate_to: navigate_to.map(|url| url.to_string()),
        tabs: tab_urls,
        current_index,
        interactive_target: target.is_interactive(),
    })
}
