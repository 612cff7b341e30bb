//! Network client for umbra.
//!
//! This crate provides the HTTP fetch pipeline behind the cache worker:
//! URL canonicalization for stable cache identities, the `Fetch` trait the
//! worker dispatches through, and a reqwest-backed implementation.

pub mod fetch;

pub use fetch::{Fetch, FetchClient, FetchConfig, FetchResponse};
pub use fetch::url::canonicalize;
