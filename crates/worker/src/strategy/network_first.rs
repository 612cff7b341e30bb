//! Network-first strategy.
//!
//! Prefer a fresh network response, fall back to cache, fall back to the
//! precached offline page for document navigations.

use super::store_response;
use crate::response::WorkerResponse;
use umbra_client::Fetch;
use umbra_core::{CacheStore, Destination, GenerationSet, Request};
use url::Url;

/// Execute the network-first strategy for one GET request.
///
/// Successful responses are copied into the API generation for API-tagged
/// requests and the runtime generation otherwise; the live response is
/// returned either way. On network failure the cache is consulted across
/// all generations, then the offline page (documents only), then a
/// synthetic 503.
pub(crate) async fn execute(
    store: &CacheStore,
    fetcher: &dyn Fetch,
    generations: &GenerationSet,
    offline_url: &Url,
    request: &Request,
) -> WorkerResponse {
    let generation = if request.is_api() { &generations.api } else { &generations.runtime };

    match fetcher.fetch(request).await {
        Ok(resp) => {
            if resp.is_ok() {
                store_response(store, generation, request, &resp).await;
            }
            WorkerResponse::from_network(resp)
        }
        Err(err) => {
            tracing::debug!(url = %request.url, error = %err, "network failed, falling back to cache");

            match store.match_any(request).await {
                Ok(Some(cached)) => return WorkerResponse::from_cache(cached),
                Ok(None) => {}
                Err(err) => tracing::warn!(url = %request.url, error = %err, "cache lookup failed"),
            }

            if request.destination == Destination::Document {
                let fallback = Request::get(offline_url.clone());
                match store.match_any(&fallback).await {
                    Ok(Some(page)) => return WorkerResponse::from_precache(page),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "offline page lookup failed"),
                }
                return WorkerResponse::offline();
            }

            WorkerResponse::network_error()
        }
    }
}
