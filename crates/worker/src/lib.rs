//! The umbra cache worker.
//!
//! Intercepts GET requests and decides, per request, whether to serve from
//! a local cache generation, the network, or both concurrently. Route
//! classification picks one of three strategies (network-first,
//! cache-first, stale-while-revalidate); an install/activate lifecycle
//! manages versioned cache generations.

pub mod lifecycle;
pub mod response;
pub mod routes;
mod strategy;
mod worker;

pub use lifecycle::WorkerState;
pub use response::{ResponseSource, WorkerResponse};
pub use routes::{RouteTable, Strategy};
pub use worker::Worker;
