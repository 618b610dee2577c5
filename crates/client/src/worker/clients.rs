//! Open pages and the worker controlling each of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

/// Identifier of an open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClientId(pub u64);

#[derive(Debug, Clone)]
struct ClientInfo {
    url: Url,
    controller: Option<u64>,
}

/// Registry of open pages.
#[derive(Debug, Default)]
pub struct Clients {
    inner: RwLock<HashMap<ClientId, ClientInfo>>,
    next_id: AtomicU64,
}

impl Clients {
    /// Register a newly opened page. It starts uncontrolled.
    pub async fn open(&self, url: Url) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.inner.write().await.insert(id, ClientInfo { url, controller: None });
        id
    }

    /// The open page at `url`, if any.
    pub async fn find(&self, url: &Url) -> Option<ClientId> {
        self.inner
            .read()
            .await
            .iter()
            .find(|(_, info)| &info.url == url)
            .map(|(id, _)| *id)
    }

    /// Put one page under `worker`'s control. Returns false if it is not open.
    pub async fn control(&self, id: ClientId, worker: u64) -> bool {
        match self.inner.write().await.get_mut(&id) {
            Some(info) => {
                info.controller = Some(worker);
                true
            }
            None => false,
        }
    }

    /// Forget a closed page. Returns false if it was not registered.
    pub async fn close(&self, id: ClientId) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Make `worker` the controller of every open page.
    ///
    /// Returns the number of pages now controlled by it.
    pub async fn claim(&self, worker: u64) -> usize {
        let mut inner = self.inner.write().await;
        for info in inner.values_mut() {
            info.controller = Some(worker);
        }
        tracing::debug!(worker, clients = inner.len(), "claimed clients");
        inner.len()
    }

    /// Worker controlling the page, if any.
    pub async fn controller(&self, id: ClientId) -> Option<u64> {
        self.inner.read().await.get(&id).and_then(|info| info.controller)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
