//! Offline cache worker.
//!
//! ### Lifecycle
//! - `Parsed → Installing → Installed → Activating → Activated`.
//! - A failed install, or replacement by a newer worker, ends in `Redundant`.
//!
//! ### Install
//! - Fetch every precache asset; any transport failure or non-2xx status
//!   fails the install and nothing is stored.
//! - Store all responses in one transaction, then request skip-waiting.
//!
//! ### Activate
//! - Drop cache stores of other generations and claim every open client.
//!
//! ### Fetch routing
//! - Navigations go network-first and fall back to the cached offline page.
//! - Everything else goes cache-first and falls through to the network.
//! - Nothing fetched at runtime is written back to the cache.

pub mod clients;
pub mod registration;

#[cfg(test)]
pub(crate) mod testing;

pub use clients::{ClientId, Clients};
pub use registration::{ActiveWorker, Registration, Update};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::fetch::{Network, resolve};
use reflekt_core::{AppConfig, CacheDb, Error, Request, Response};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    Cache,
    Network,
    OfflineFallback,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::Cache => "cache",
            FetchSource::Network => "network",
            FetchSource::OfflineFallback => "offline_fallback",
        }
    }
}

/// Response produced by fetch interception.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: FetchSource,
    /// Id of the worker that handled the request.
    pub worker: u64,
}

/// Result of activating a worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activation {
    /// Cache stores of other generations that were deleted.
    pub deleted_caches: Vec<String>,
    /// Number of clients now controlled by this worker.
    pub claimed_clients: usize,
}

/// Fixed caching policy of one worker generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub cache_name: String,
    pub precache: Vec<Url>,
    pub offline_page: Url,
}

impl WorkerConfig {
    /// Resolve the precache manifest against the configured origin.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let precache = config
            .precache
            .iter()
            .map(|path| resolve(&origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_page = resolve(&origin, &config.offline_page)
            .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.offline_page)))?;

        Ok(Self { cache_name: config.cache_name.clone(), precache, offline_page })
    }
}

/// A worker instance bound to one cache generation.
pub struct ServiceWorker<N: Network> {
    id: u64,
    config: WorkerConfig,
    db: CacheDb,
    network: Arc<N>,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
}

impl<N: Network> ServiceWorker<N> {
    pub fn new(config: WorkerConfig, db: CacheDb, network: Arc<N>) -> Self {
        Self {
            id: NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed),
            config,
            db,
            network,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether install asked to replace the current worker without waiting.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::Acquire)
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState(format!("worker {} is {:?}, expected {:?}", self.id, *state, from)));
        }
        *state = to;
        tracing::info!(worker = self.id, cache = %self.config.cache_name, ?to, "worker state change");
        Ok(())
    }

    /// Mark this worker as replaced.
    pub async fn mark_redundant(&self) {
        *self.state.write().await = WorkerState::Redundant;
        tracing::info!(worker = self.id, "worker redundant");
    }

    /// Populate the cache store from the precache manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrecacheFailed`] for the first asset that could not be
    /// fetched or answered with a non-2xx status. The worker becomes
    /// redundant and no entry is stored.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition(WorkerState::Parsed, WorkerState::Installing).await?;

        match self.precache().await {
            Ok(count) => {
                self.transition(WorkerState::Installing, WorkerState::Installed).await?;
                self.skip_waiting.store(true, Ordering::Release);
                tracing::info!(worker = self.id, entries = count, "precache complete, skipping wait");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(worker = self.id, error = %e, "install failed");
                self.mark_redundant().await;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let mut entries = Vec::with_capacity(self.config.precache.len());
        for url in &self.config.precache {
            let request = Request::get(url.clone());
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::PrecacheFailed { url: url.to_string(), reason: e.to_string() })?;

            if !response.ok() {
                return Err(Error::PrecacheFailed { url: url.to_string(), reason: format!("status {}", response.status) });
            }
            entries.push((request, response));
        }

        self.db.put_all(&self.config.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Activate the installed worker and take control of every open client.
    ///
    /// Cache stores belonging to other generations are deleted.
    pub async fn activate(&self, clients: &Clients) -> Result<Activation, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;

        let deleted_caches = self.db.delete_caches_except(&self.config.cache_name).await?;
        if !deleted_caches.is_empty() {
            tracing::info!(worker = self.id, deleted = ?deleted_caches, "deleted old cache generations");
        }

        let claimed_clients = clients.claim(self.id).await;
        self.transition(WorkerState::Activating, WorkerState::Activated).await?;

        Ok(Activation { deleted_caches, claimed_clients })
    }

    /// Bring back a worker whose cache store already holds the manifest.
    ///
    /// Used when the host restarts with a populated database; the worker
    /// goes straight to `Activated` without refetching anything. Every
    /// precache URL (offline page included) must be stored, otherwise the
    /// store belongs to an older manifest and false is returned.
    pub async fn resume(&self, clients: &Clients) -> Result<bool, Error> {
        let mut manifest: Vec<Request> = self.config.precache.iter().cloned().map(Request::get).collect();
        manifest.push(Request::get(self.config.offline_page.clone()));
        if !self.db.contains_all(&self.config.cache_name, &manifest).await? {
            return Ok(false);
        }
        self.transition(WorkerState::Parsed, WorkerState::Activated).await?;
        clients.claim(self.id).await;
        Ok(true)
    }

    /// Intercept a request issued by a controlled page.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` if the worker is not activated.
    /// - For subresources, the live fetch error on a cache miss.
    /// - For navigations, the live fetch error only when the offline page is
    ///   missing from the cache as well.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let state = self.state().await;
        if state != WorkerState::Activated {
            return Err(Error::InvalidState(format!("worker {} is {:?}, cannot intercept fetches", self.id, state)));
        }

        if request.is_navigation() {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let err = match self.network.fetch(request).await {
            Ok(response) => return Ok(FetchOutcome { response, source: FetchSource::Network, worker: self.id }),
            Err(e) => e,
        };

        tracing::warn!(url = %request.url, error = %err, offline = err.is_network_failure(), "navigation failed, serving offline page");

        let offline = Request::get(self.config.offline_page.clone());
        match self.db.match_request(&self.config.cache_name, &offline).await? {
            Some(response) => Ok(FetchOutcome { response, source: FetchSource::OfflineFallback, worker: self.id }),
            None => {
                tracing::warn!(offline_page = %self.config.offline_page, "offline page missing from cache");
                Err(err)
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<FetchOutcome, Error> {
        if let Some(response) = self.db.match_request(&self.config.cache_name, request).await? {
            tracing::debug!("cache hit for {}", request.url);
            return Ok(FetchOutcome { response, source: FetchSource::Cache, worker: self.id });
        }

        tracing::debug!("cache miss for {}", request.url);
        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome { response, source: FetchSource::Network, worker: self.id })
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{StubNetwork, origin};
    use super::*;
    use reflekt_core::RequestMode;

    const V1: &str = "reflekt-cache-v1";

    async fn setup() -> (CacheDb, Arc<StubNetwork>, ServiceWorker<StubNetwork>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(StubNetwork::with_site());
        let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
        let worker = ServiceWorker::new(config, db.clone(), network.clone());
        (db, network, worker)
    }

    async fn activated() -> (CacheDb, Arc<StubNetwork>, ServiceWorker<StubNetwork>) {
        let (db, network, worker) = setup().await;
        worker.install().await.unwrap();
        worker.activate(&Clients::default()).await.unwrap();
        network.clear_calls();
        (db, network, worker)
    }

    #[test]
    fn test_worker_config_from_app() {
        let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
        assert_eq!(config.cache_name, V1);
        assert_eq!(config.precache.len(), 7);
        assert_eq!(config.precache[0].as_str(), "http://localhost:5000/");
        assert_eq!(config.offline_page.as_str(), "http://localhost:5000/static/offline.html");
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let (db, network, worker) = setup().await;

        worker.install().await.unwrap();

        assert_eq!(worker.state().await, WorkerState::Installed);
        assert!(worker.skip_waiting_requested());
        assert_eq!(db.entry_count(V1).await.unwrap(), 7);
        assert_eq!(network.calls().len(), 7);

        let mut stored: Vec<String> = db.entries(V1).await.unwrap().into_iter().map(|e| e.url).collect();
        let mut manifest: Vec<String> = WorkerConfig::from_app(&AppConfig::default()).unwrap().precache.iter().map(|u| u.to_string()).collect();
        stored.sort();
        manifest.sort();
        assert_eq!(stored, manifest);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let (db, network, worker) = setup().await;
        network.remove("/static/icons/icon-512.png");

        let err = worker.install().await.unwrap_err();

        assert!(matches!(&err, Error::PrecacheFailed { url, reason }
            if url.ends_with("/static/icons/icon-512.png") && reason == "status 404"));
        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert!(!worker.skip_waiting_requested());
        assert_eq!(db.entry_count(V1).await.unwrap(), 0);
        assert!(db.cache_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_when_offline() {
        let (db, network, worker) = setup().await;
        network.set_offline(true);

        let err = worker.install().await.unwrap_err();

        assert!(matches!(err, Error::PrecacheFailed { .. }));
        assert_eq!(db.entry_count(V1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_install_twice_rejected() {
        let (_db, _network, worker) = setup().await;
        worker.install().await.unwrap();
        assert!(matches!(worker.install().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let (_db, _network, worker) = setup().await;
        let result = worker.activate(&Clients::default()).await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_claims_clients_and_drops_old_generations() {
        let (db, _network, worker) = setup().await;
        db.put_all("reflekt-cache-v0", &[]).await.unwrap();
        let clients = Clients::default();
        let page = clients.open(origin().join("/reflections").unwrap()).await;

        worker.install().await.unwrap();
        let activation = worker.activate(&clients).await.unwrap();

        assert_eq!(activation.deleted_caches, vec!["reflekt-cache-v0".to_string()]);
        assert_eq!(activation.claimed_clients, 1);
        assert_eq!(clients.controller(page).await, Some(worker.id()));
        assert_eq!(worker.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_fetch_before_activation_rejected() {
        let (_db, _network, worker) = setup().await;
        worker.install().await.unwrap();

        let request = Request::get(origin().join("/static/style.css").unwrap());
        assert!(matches!(worker.handle_fetch(&request).await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_static_asset_served_from_cache() {
        let (_db, network, worker) = activated().await;

        let request = Request::get(origin().join("/static/style.css").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::Cache);
        assert_eq!(outcome.response.text(), "body { margin: 0 }");
        assert!(network.calls().is_empty());
    }

    #[tokio::test]
    async fn test_static_asset_served_from_cache_when_offline() {
        let (_db, network, worker) = activated().await;
        network.set_offline(true);

        let request = Request::get(origin().join("/static/manifest.json").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();
        assert_eq!(outcome.source, FetchSource::Cache);
    }

    #[tokio::test]
    async fn test_cache_miss_goes_to_network_without_write_back() {
        let (db, network, worker) = activated().await;
        network.insert("/static/radar_anna.png", 200, "png-bytes");

        let request = Request::get(origin().join("/static/radar_anna.png").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(outcome.response.text(), "png-bytes");
        assert_eq!(network.calls(), vec!["http://localhost:5000/static/radar_anna.png".to_string()]);
        assert_eq!(db.entry_count(V1).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cache_miss_offline_propagates_error() {
        let (_db, network, worker) = activated().await;
        network.set_offline(true);

        let request = Request::get(origin().join("/static/radar_anna.png").unwrap());
        let err = worker.handle_fetch(&request).await.unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let (_db, network, worker) = activated().await;

        let request = Request::new(origin().join("/static/style.css").unwrap(), "POST", RequestMode::SameOrigin);
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(network.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_prefers_network() {
        let (db, network, worker) = activated().await;
        network.insert("/", 200, "<h1>fresh home</h1>");

        let request = Request::navigate(origin().join("/").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(outcome.response.text(), "<h1>fresh home</h1>");

        let cached = db.match_request(V1, &Request::get(origin())).await.unwrap().unwrap();
        assert_eq!(cached.text(), "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_navigation_http_error_returned_as_is() {
        let (_db, _network, worker) = activated().await;

        let request = Request::navigate(origin().join("/does-not-exist").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(outcome.response.status, 404);
    }

    #[tokio::test]
    async fn test_navigation_offline_serves_offline_page() {
        let (_db, network, worker) = activated().await;
        network.set_offline(true);

        let request = Request::navigate(origin().join("/reflections").unwrap());
        let outcome = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(outcome.source, FetchSource::OfflineFallback);
        assert_eq!(outcome.response.text(), "<h1>offline</h1>");
    }

    #[tokio::test]
    async fn test_navigation_offline_without_offline_page() {
        let (db, network, worker) = activated().await;
        db.delete_cache(V1).await.unwrap();
        network.set_offline(true);

        let request = Request::navigate(origin().join("/reflections").unwrap());
        let err = worker.handle_fetch(&request).await.unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_concurrent_interceptions_are_independent() {
        let (_db, network, worker) = activated().await;
        let worker = Arc::new(worker);
        network.insert("/static/radar_anna.png", 200, "png-bytes");

        let mut handles = Vec::new();
        for path in ["/static/style.css", "/static/radar_anna.png", "/static/swipe.js", "/"] {
            let worker = worker.clone();
            let request = Request::get(origin().join(path).unwrap());
            handles.push(tokio::spawn(async move { worker.handle_fetch(&request).await }));
        }

        let mut sources = Vec::new();
        for handle in handles {
            sources.push(handle.await.unwrap().unwrap().source);
        }
        assert_eq!(sources, vec![FetchSource::Cache, FetchSource::Network, FetchSource::Cache, FetchSource::Cache]);
    }

    #[tokio::test]
    async fn test_resume_with_complete_store() {
        let (db, network, worker) = setup().await;
        worker.install().await.unwrap();

        let config = WorkerConfig::from_app(&AppConfig::default()).unwrap();
        let resumed = ServiceWorker::new(config, db, network);
        assert!(resumed.resume(&Clients::default()).await.unwrap());
        assert_eq!(resumed.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_resume_with_empty_store() {
        let (_db, _network, worker) = setup().await;
        assert!(!worker.resume(&Clients::default()).await.unwrap());
        assert_eq!(worker.state().await, WorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_resume_rejects_store_of_older_manifest() {
        let (db, network, worker) = setup().await;
        worker.install().await.unwrap();

        let mut app = AppConfig { offline_page: "/static/offline2.html".into(), ..Default::default() };
        for path in app.precache.iter_mut().filter(|p| p.as_str() == "/static/offline.html") {
            *path = "/static/offline2.html".into();
        }
        let config = WorkerConfig::from_app(&app).unwrap();
        let resumed = ServiceWorker::new(config, db.clone(), network);

        assert!(!resumed.resume(&Clients::default()).await.unwrap());
        assert_eq!(resumed.state().await, WorkerState::Parsed);
        assert_eq!(db.entry_count(V1).await.unwrap(), 7);
    }
}
