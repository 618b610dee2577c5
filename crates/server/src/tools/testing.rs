//! Fixtures shared by tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use reflekt_client::{Network, Registration};
use reflekt_core::{AppConfig, CacheDb, Error, Request, Response};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

/// Answers every request with 200 and the request path as body, unless offline.
#[derive(Default)]
pub(crate) struct EchoSite {
    offline: AtomicBool,
}

impl EchoSite {
    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Network for EchoSite {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkError("offline".into()));
        }

        Ok(Response {
            url: request.url.to_string(),
            status: 200,
            content_type: Some("text/plain".into()),
            headers: Vec::new(),
            body: Bytes::from(request.url.path().to_string()),
        })
    }
}

pub(crate) async fn registration() -> (Arc<Registration<EchoSite>>, Arc<EchoSite>) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let site = Arc::new(EchoSite::default());
    (Arc::new(Registration::new(db, site.clone())), site)
}

pub(crate) fn config() -> AppConfig {
    AppConfig::default()
}

/// Decode the JSON text content of a tool result.
pub(crate) fn parse_output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
