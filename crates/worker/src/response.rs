//! HTTP-shaped responses produced by the worker.
//!
//! Every handling path terminates in one of these; no failure is ever
//! surfaced to the caller as an error. Synthetic bodies and status codes
//! ("Offline" 503, "Network error" 503, "Not found" 404) are part of the
//! observable contract.

use bytes::Bytes;
use umbra_client::FetchResponse;
use umbra_core::StoredResponse;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Live network response.
    Network,
    /// Served from a cache generation.
    Cache,
    /// The precached offline fallback page.
    Precache,
    /// Synthesized locally, nothing was available.
    Synthetic,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Precache => "precache",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// The response handed back to the caller of `Worker::handle`.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl WorkerResponse {
    pub(crate) fn from_network(resp: FetchResponse) -> Self {
        Self {
            status: resp.status,
            headers: resp.headers,
            body: resp.bytes,
            source: ResponseSource::Network,
        }
    }

    pub(crate) fn from_cache(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            headers: stored.headers,
            body: stored.body,
            source: ResponseSource::Cache,
        }
    }

    pub(crate) fn from_precache(stored: StoredResponse) -> Self {
        Self {
            status: stored.status,
            headers: stored.headers,
            body: stored.body,
            source: ResponseSource::Precache,
        }
    }

    fn synthetic(status: u16, body: &'static str) -> Self {
        Self {
            status,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: Bytes::from_static(body.as_bytes()),
            source: ResponseSource::Synthetic,
        }
    }

    /// 503 fallback when even the offline page is missing.
    pub(crate) fn offline() -> Self {
        Self::synthetic(503, "Offline")
    }

    /// 503 fallback for failed sub-resource and passthrough requests.
    pub(crate) fn network_error() -> Self {
        Self::synthetic(503, "Network error")
    }

    /// 404 fallback for cache-first misses with no network.
    pub(crate) fn not_found() -> Self {
        Self::synthetic(404, "Not found")
    }

    /// HTTP status in the "ok" range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
