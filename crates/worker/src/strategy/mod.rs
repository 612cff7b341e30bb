//! Strategy executors.
//!
//! Each executor consumes the classifier's decision and the cache store and
//! always produces a well-formed response; network and store failures are
//! recovered locally, never propagated. Within one request the network-first
//! and cache-first paths are fully sequential; stale-while-revalidate
//! decouples its background store from the response path.

pub(crate) mod cache_first;
pub(crate) mod network_first;
pub(crate) mod swr;

use umbra_client::FetchResponse;
use umbra_core::{CacheStore, Request};

/// Store a successful network response into a generation, swallowing store
/// failures: a broken cache must not fail a response already in hand.
pub(crate) async fn store_response(
    store: &CacheStore,
    generation: &str,
    request: &Request,
    resp: &FetchResponse,
) {
    if let Err(err) = store.put_entry(generation, request, &resp.clone().into()).await {
        tracing::warn!(url = %request.url, generation, error = %err, "cache write failed");
    }
}
