//! Stale-while-revalidate strategy.
//!
//! Return the cached response immediately when present, while a detached
//! background task refreshes the cache from the network for next time.
//! The response path and the background write have no ordering guarantee
//! relative to each other; returning stale data is the point.

use std::sync::Arc;

use super::store_response;
use crate::response::WorkerResponse;
use tokio::task::JoinHandle;
use umbra_client::Fetch;
use umbra_core::{CacheStore, GenerationSet, Request};

/// Result of one stale-while-revalidate execution.
///
/// The worker detaches `revalidation`; tests await it to observe the
/// refreshed cache state deterministically.
pub(crate) struct SwrOutcome {
    pub(crate) response: WorkerResponse,
    pub(crate) revalidation: Option<JoinHandle<()>>,
}

/// Execute the stale-while-revalidate strategy for one GET request.
///
/// With a cached entry, the caller gets it at once and the network fetch
/// runs in the background (failures logged and ignored). Without one, the
/// caller waits for the network; a transport failure then yields a
/// synthetic 503.
pub(crate) async fn execute(
    store: &CacheStore,
    fetcher: Arc<dyn Fetch>,
    generations: &GenerationSet,
    request: &Request,
) -> SwrOutcome {
    let cached = match store.match_any(request).await {
        Ok(cached) => cached,
        Err(err) => {
            tracing::warn!(url = %request.url, error = %err, "cache lookup failed");
            None
        }
    };

    if let Some(cached) = cached {
        let store = store.clone();
        let generation = generations.runtime.clone();
        let request = request.clone();
        let revalidation = tokio::spawn(async move {
            match fetcher.fetch(&request).await {
                Ok(resp) if resp.is_ok() => {
                    store_response(&store, &generation, &request, &resp).await
                }
                Ok(resp) => {
                    tracing::debug!(url = %request.url, status = resp.status, "revalidation not stored");
                }
                Err(err) => {
                    tracing::debug!(url = %request.url, error = %err, "revalidation failed");
                }
            }
        });

        return SwrOutcome {
            response: WorkerResponse::from_cache(cached),
            revalidation: Some(revalidation),
        };
    }

    let response = match fetcher.fetch(request).await {
        Ok(resp) => {
            if resp.is_ok() {
                store_response(store, &generations.runtime, request, &resp).await;
            }
            WorkerResponse::from_network(resp)
        }
        Err(err) => {
            tracing::debug!(url = %request.url, error = %err, "no cache entry and network error");
            WorkerResponse::network_error()
        }
    };

    SwrOutcome { response, revalidation: None }
}
