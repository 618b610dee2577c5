//! In-memory network used by worker tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use url::Url;

use crate::fetch::Network;
use reflekt_core::{Error, Request, Response};

pub(crate) fn origin() -> Url {
    Url::parse("http://localhost:5000/").unwrap()
}

/// Serves canned responses by URL and records every request it sees.
///
/// Unknown URLs answer 404; `set_offline(true)` makes every fetch fail.
#[derive(Default)]
pub(crate) struct StubNetwork {
    responses: Mutex<HashMap<String, (u16, &'static str)>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl StubNetwork {
    /// The app's precache assets, all answering 200.
    pub(crate) fn with_site() -> Self {
        let stub = Self::default();
        stub.insert("/", 200, "<h1>home</h1>");
        stub.insert("/static/style.css", 200, "body { margin: 0 }");
        stub.insert("/static/offline.html", 200, "<h1>offline</h1>");
        stub.insert("/static/icons/icon-192.png", 200, "icon-192");
        stub.insert("/static/icons/icon-512.png", 200, "icon-512");
        stub.insert("/static/manifest.json", 200, "{\"name\":\"reflekt\"}");
        stub.insert("/static/swipe.js", 200, "// swipe");
        stub
    }

    pub(crate) fn insert(&self, path: &str, status: u16, body: &'static str) {
        let url = origin().join(path).unwrap().to_string();
        self.responses.lock().unwrap().insert(url, (status, body));
    }

    pub(crate) fn remove(&self, path: &str) {
        let url = origin().join(path).unwrap().to_string();
        self.responses.lock().unwrap().remove(&url);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.url.to_string());

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkError("offline".into()));
        }

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .copied()
            .unwrap_or((404, "not found"));

        Ok(Response {
            url: request.url.to_string(),
            status,
            content_type: None,
            headers: Vec::new(),
            body: Bytes::from_static(body.as_bytes()),
        })
    }
}
