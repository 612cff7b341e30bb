//! The worker itself: intercepts requests and dispatches strategies.

use std::sync::Arc;

use crate::lifecycle::{self, WorkerState};
use crate::response::WorkerResponse;
use crate::routes::{RouteTable, Strategy};
use crate::strategy::{cache_first, network_first, swr};
use umbra_client::Fetch;
use umbra_core::{AppConfig, CacheStore, Error, GenerationSet, Request};
use url::Url;

/// The offline cache worker.
///
/// Sits between the application and the network. Each call to [`handle`]
/// runs as an independent task; handlers share nothing but the store,
/// whose UPSERT writes give per-key last-write-wins semantics, so there is
/// no locking and no cross-request ordering.
///
/// [`handle`]: Worker::handle
pub struct Worker {
    store: CacheStore,
    fetcher: Arc<dyn Fetch>,
    routes: RouteTable,
    generations: GenerationSet,
    origin: Url,
    offline_url: Url,
    manifest: Vec<String>,
    state: WorkerState,
}

impl Worker {
    /// Build a worker over an open store and a fetch implementation.
    ///
    /// The worker starts in `Installing` and serves requests sensibly only
    /// after [`start`] (or `install` + `activate`) has run.
    ///
    /// [`start`]: Worker::start
    pub fn new(
        store: CacheStore,
        fetcher: Arc<dyn Fetch>,
        config: &AppConfig,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let offline_url = origin
            .join(&config.offline_path)
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            store,
            fetcher,
            routes: RouteTable::default(),
            generations: config.generations(),
            origin,
            offline_url,
            manifest: config.precache_manifest.clone(),
            state: WorkerState::Installing,
        })
    }

    /// Replace the default route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn generations(&self) -> &GenerationSet {
        &self.generations
    }

    /// Populate the precache generation from the asset manifest.
    ///
    /// # Errors
    ///
    /// Propagates `Error::InstallFailed` if any manifest asset cannot be
    /// fetched and stored; the worker then stays in `Installing`.
    pub async fn install(&mut self) -> Result<(), Error> {
        self.state = WorkerState::Installing;
        lifecycle::install(
            &self.store,
            self.fetcher.as_ref(),
            &self.origin,
            &self.generations.precache,
            &self.manifest,
        )
        .await?;
        self.state = WorkerState::Installed;
        Ok(())
    }

    /// Sweep superseded generations and take control.
    ///
    /// Returns the names of the deleted generations.
    pub async fn activate(&mut self) -> Result<Vec<String>, Error> {
        self.state = WorkerState::Activating;
        let deleted = lifecycle::activate(&self.store, &self.generations).await?;
        self.state = WorkerState::Activated;
        Ok(deleted)
    }

    /// Install then activate immediately.
    ///
    /// There is no waiting state in between: a freshly installed worker
    /// takes control without waiting for older instances to wind down.
    pub async fn start(&mut self) -> Result<(), Error> {
        self.install().await?;
        self.activate().await?;
        Ok(())
    }

    /// Intercept one request and produce an HTTP-shaped response.
    ///
    /// Non-GET requests pass straight through to the network, untouched by
    /// route rules and never cached. GET requests are classified by path
    /// and dispatched to the matching strategy. This never returns an
    /// error; every failure path ends in a synthetic response.
    pub async fn handle(&self, request: Request) -> WorkerResponse {
        if !request.method.is_get() {
            return self.passthrough(&request).await;
        }

        match self.routes.classify(request.path()) {
            Strategy::NetworkFirst => {
                network_first::execute(
                    &self.store,
                    self.fetcher.as_ref(),
                    &self.generations,
                    &self.offline_url,
                    &request,
                )
                .await
            }
            Strategy::CacheFirst => {
                cache_first::execute(
                    &self.store,
                    self.fetcher.as_ref(),
                    &self.generations,
                    &request,
                )
                .await
            }
            Strategy::StaleWhileRevalidate => {
                let outcome =
                    swr::execute(&self.store, self.fetcher.clone(), &self.generations, &request)
                        .await;
                // detach the background refresh; it finishes on its own time
                drop(outcome.revalidation);
                outcome.response
            }
        }
    }

    async fn passthrough(&self, request: &Request) -> WorkerResponse {
        match self.fetcher.fetch(request).await {
            Ok(resp) => WorkerResponse::from_network(resp),
            Err(err) => {
                tracing::debug!(method = %request.method, url = %request.url, error = %err, "passthrough failed");
                WorkerResponse::network_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseSource;
    use crate::strategy::testing::MockFetch;
    use bytes::Bytes;
    use umbra_core::Method;

    fn config() -> AppConfig {
        AppConfig {
            origin: "https://example.com".into(),
            cache_prefix: "pages".into(),
            precache_manifest: vec!["/".into(), "/offline.html".into()],
            ..Default::default()
        }
    }

    fn routed_fetch() -> Arc<MockFetch> {
        let fetch = MockFetch::new();
        fetch.respond("https://example.com/", 200, "shell");
        fetch.respond("https://example.com/offline.html", 200, "offline page");
        Arc::new(fetch)
    }

    async fn started_worker(fetch: Arc<MockFetch>) -> Worker {
        let store = CacheStore::open_in_memory().await.unwrap();
        let mut worker = Worker::new(store, fetch, &config()).unwrap();
        worker.start().await.unwrap();
        worker
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let mut worker = Worker::new(store, routed_fetch(), &config()).unwrap();
        assert_eq!(worker.state(), WorkerState::Installing);

        worker.install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);

        worker.activate().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_failed_install_keeps_installing_state() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let fetch = Arc::new(MockFetch::new());
        fetch.set_offline(true);
        let mut worker = Worker::new(store, fetch, &config()).unwrap();

        assert!(worker.install().await.is_err());
        assert_eq!(worker.state(), WorkerState::Installing);
    }

    #[tokio::test]
    async fn test_non_get_passes_through_untouched() {
        let fetch = routed_fetch();
        fetch.respond("https://example.com/api/comments", 201, "created");
        let worker = started_worker(fetch.clone()).await;

        let calls_before = fetch.calls();
        let req = Request::new(
            Method::Post,
            Url::parse("https://example.com/api/comments").unwrap(),
        )
        .with_body(Bytes::from_static(b"{\"text\":\"hi\"}"));
        let resp = worker.handle(req.clone()).await;

        assert_eq!(resp.status, 201);
        assert_eq!(resp.source, ResponseSource::Network);
        assert_eq!(fetch.calls(), calls_before + 1);

        // never cached, even though /api/ is a network-first route for GETs
        assert!(worker.store.match_any(&req).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_get_offline_synthesizes_503() {
        let fetch = routed_fetch();
        let worker = started_worker(fetch.clone()).await;
        fetch.set_offline(true);

        let req = Request::new(
            Method::Delete,
            Url::parse("https://example.com/api/comments/1").unwrap(),
        );
        let resp = worker.handle(req).await;

        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, Bytes::from_static(b"Network error"));
    }

    #[tokio::test]
    async fn test_handle_dispatches_by_route() {
        let fetch = routed_fetch();
        fetch.respond("https://example.com/api/papers", 200, "[]");
        fetch.respond("https://example.com/icons/icon-192x192.png", 200, "icon");
        let worker = started_worker(fetch.clone()).await;

        let api = worker
            .handle(Request::get(Url::parse("https://example.com/api/papers").unwrap()))
            .await;
        assert_eq!(api.source, ResponseSource::Network);

        // precached shell page is served stale from "/"
        let shell = worker
            .handle(Request::navigation(Url::parse("https://example.com/").unwrap()))
            .await;
        assert_eq!(shell.source, ResponseSource::Cache);
        assert_eq!(shell.body, Bytes::from_static(b"shell"));
    }

    #[tokio::test]
    async fn test_custom_route_table() {
        let fetch = routed_fetch();
        fetch.respond("https://example.com/everything/else", 200, "x");
        let store = CacheStore::open_in_memory().await.unwrap();
        let mut worker = Worker::new(store, fetch.clone(), &config())
            .unwrap()
            .with_routes(RouteTable::new(&[], &["/everything/"], &[]));
        worker.start().await.unwrap();

        let req = Request::get(Url::parse("https://example.com/everything/else").unwrap());
        worker.handle(req.clone()).await;
        let second = worker.handle(req).await;
        assert_eq!(second.source, ResponseSource::Cache);
    }
}
