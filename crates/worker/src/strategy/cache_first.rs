//! Cache-first strategy.
//!
//! Serve from cache when available; only consult the network on a miss.

use super::store_response;
use crate::response::WorkerResponse;
use umbra_client::Fetch;
use umbra_core::{CacheStore, GenerationSet, Request};

/// Execute the cache-first strategy for one GET request.
///
/// A hit in any generation returns immediately without touching the
/// network. A miss fetches, stores successful responses into the runtime
/// generation, and returns the live response; a miss with the network down
/// yields a synthetic 404.
pub(crate) async fn execute(
    store: &CacheStore,
    fetcher: &dyn Fetch,
    generations: &GenerationSet,
    request: &Request,
) -> WorkerResponse {
    match store.match_any(request).await {
        Ok(Some(cached)) => return WorkerResponse::from_cache(cached),
        Ok(None) => {}
        Err(err) => tracing::warn!(url = %request.url, error = %err, "cache lookup failed"),
    }

    match fetcher.fetch(request).await {
        Ok(resp) => {
            if resp.is_ok() {
                store_response(store, &generations.runtime, request, &resp).await;
            }
            WorkerResponse::from_network(resp)
        }
        Err(err) => {
            tracing::debug!(url = %request.url, error = %err, "cache miss and network error");
            WorkerResponse::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseSource;
    use crate::strategy::testing::MockFetch;
    use bytes::Bytes;
    use umbra_core::StoredResponse;
    use url::Url;

    fn generations() -> GenerationSet {
        GenerationSet::new("pages", 1)
    }

    async fn store_with_generations() -> CacheStore {
        let store = CacheStore::open_in_memory().await.unwrap();
        for name in generations().names() {
            store.ensure_generation(name).await.unwrap();
        }
        store
    }

    fn request(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_hit_never_touches_network() {
        let store = store_with_generations().await;
        let fetch = MockFetch::new();

        let req = request("https://example.com/icons/icon-192x192.png");
        let png = StoredResponse::new(200, vec![], Bytes::from_static(b"png"));
        store.put_entry("pages-v1", &req, &png).await.unwrap();

        let resp = execute(&store, &fetch, &generations(), &req).await;

        assert_eq!(resp.body, Bytes::from_static(b"png"));
        assert_eq!(resp.source, ResponseSource::Cache);
        assert_eq!(fetch.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores_runtime() {
        let store = store_with_generations().await;
        let fetch = MockFetch::new();
        fetch.respond("https://example.com/fonts/inter.woff2", 200, "woff2");

        let req = request("https://example.com/fonts/inter.woff2");
        let resp = execute(&store, &fetch, &generations(), &req).await;

        assert_eq!(resp.source, ResponseSource::Network);
        assert_eq!(fetch.calls(), 1);
        let stored = store.get_entry("pages-runtime-v1", &req).await.unwrap().unwrap();
        assert_eq!(stored.body, Bytes::from_static(b"woff2"));
    }

    #[tokio::test]
    async fn test_miss_then_hit_stops_fetching() {
        let store = store_with_generations().await;
        let fetch = MockFetch::new();
        fetch.respond("https://example.com/static/app.js", 200, "js");

        let req = request("https://example.com/static/app.js");
        execute(&store, &fetch, &generations(), &req).await;
        let resp = execute(&store, &fetch, &generations(), &req).await;

        assert_eq!(resp.source, ResponseSource::Cache);
        assert_eq!(fetch.calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_offline_not_found() {
        let store = store_with_generations().await;
        let fetch = MockFetch::new();
        fetch.set_offline(true);

        let req = request("https://example.com/icons/missing.png");
        let resp = execute(&store, &fetch, &generations(), &req).await;

        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, Bytes::from_static(b"Not found"));
        assert_eq!(resp.source, ResponseSource::Synthetic);
    }

    #[tokio::test]
    async fn test_miss_error_status_not_cached() {
        let store = store_with_generations().await;
        let fetch = MockFetch::new();
        fetch.respond("https://example.com/icons/gone.png", 410, "gone");

        let req = request("https://example.com/icons/gone.png");
        let resp = execute(&store, &fetch, &generations(), &req).await;

        assert_eq!(resp.status, 410);
        assert!(store.match_any(&req).await.unwrap().is_none());
    }
}
