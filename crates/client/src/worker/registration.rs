//! Hosting side of the worker lifecycle.
//!
//! The registration owns the active worker and the open clients. An update
//! installs a new worker next to the active one; because install always
//! requests skip-waiting, a successful install is promoted right away and
//! the previous worker becomes redundant. A failed install leaves the
//! active worker in charge.
//!
//! Activation and the swap happen under the `active` write lock, and a
//! fetch holds the read lock until it completes, so no fetch runs against a
//! store that activation is deleting.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use url::Url;

use super::{Activation, ClientId, Clients, FetchOutcome, ServiceWorker, WorkerConfig, WorkerState};
use crate::fetch::Network;
use reflekt_core::{CacheDb, Error, Request};

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub worker: u64,
    pub cache_name: String,
    pub replaced: Option<u64>,
    pub activation: Activation,
}

/// Snapshot of the active worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveWorker {
    pub worker: u64,
    pub cache_name: String,
    pub state: WorkerState,
    pub skip_waiting: bool,
    pub cached_entries: u64,
}

/// Worker registration for one origin.
pub struct Registration<N: Network> {
    db: CacheDb,
    network: Arc<N>,
    clients: Clients,
    active: RwLock<Option<Arc<ServiceWorker<N>>>>,
    update_lock: Mutex<()>,
}

impl<N: Network> Registration<N> {
    pub fn new(db: CacheDb, network: Arc<N>) -> Self {
        Self { db, network, clients: Clients::default(), active: RwLock::new(None), update_lock: Mutex::new(()) }
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub async fn active(&self) -> Option<Arc<ServiceWorker<N>>> {
        self.active.read().await.clone()
    }

    /// Install a worker for `config` and promote it to active.
    ///
    /// Updates are serialized; fetches keep going to the current worker
    /// while the new one installs.
    pub async fn update(&self, config: WorkerConfig) -> Result<Update, Error> {
        let _guard = self.update_lock.lock().await;

        let worker = Arc::new(ServiceWorker::new(config, self.db.clone(), self.network.clone()));
        worker.install().await?;

        let mut active = self.active.write().await;
        let activation = worker.activate(&self.clients).await?;
        let previous = active.replace(worker.clone());
        drop(active);

        let replaced = match previous {
            Some(previous) => {
                previous.mark_redundant().await;
                Some(previous.id())
            }
            None => None,
        };

        tracing::info!(worker = worker.id(), cache = worker.cache_name(), ?replaced, "worker activated");

        Ok(Update { worker: worker.id(), cache_name: worker.cache_name().to_string(), replaced, activation })
    }

    /// Reinstate a worker from an already populated cache store.
    ///
    /// Returns false (and leaves the registration empty) when the store for
    /// `config` is missing or incomplete.
    pub async fn resume(&self, config: WorkerConfig) -> Result<bool, Error> {
        let _guard = self.update_lock.lock().await;

        let worker = Arc::new(ServiceWorker::new(config, self.db.clone(), self.network.clone()));
        if !worker.resume(&self.clients).await? {
            tracing::debug!(cache = worker.cache_name(), "no complete cache store to resume from");
            return Ok(false);
        }

        tracing::info!(worker = worker.id(), cache = worker.cache_name(), "worker resumed from cache store");
        *self.active.write().await = Some(worker);
        Ok(true)
    }

    /// Route a page request through the active worker.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoActiveWorker` before the first successful update.
    pub async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let active = self.active.read().await;
        let worker = active.as_ref().ok_or(Error::NoActiveWorker)?;
        worker.handle_fetch(request).await
    }

    /// Register the page at `url`, or look up the one already open there.
    ///
    /// A page opened while a worker is active is controlled by it right away.
    pub async fn open_client(&self, url: Url) -> ClientId {
        let id = match self.clients.find(&url).await {
            Some(id) => id,
            None => self.clients.open(url).await,
        };
        if let Some(worker) = self.active().await {
            self.clients.control(id, worker.id()).await;
        }
        id
    }

    /// Forget the page at `url`. Returns false if no page is open there.
    pub async fn close_client(&self, url: &Url) -> bool {
        match self.clients.find(url).await {
            Some(id) => self.clients.close(id).await,
            None => false,
        }
    }

    /// Describe the active worker, if any.
    pub async fn status(&self) -> Result<Option<ActiveWorker>, Error> {
        let Some(worker) = self.active().await else {
            return Ok(None);
        };

        Ok(Some(ActiveWorker {
            worker: worker.id(),
            cache_name: worker.cache_name().to_string(),
            state: worker.state().await,
            skip_waiting: worker.skip_waiting_requested(),
            cached_entries: self.db.entry_count(worker.cache_name()).await?,
        }))
    }
}
