//! Core types and shared functionality for umbra.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - Request/response model shared by the fetch client and the worker
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use http::{Destination, Method, Request, StoredResponse};
pub use store::{CacheStore, GenerationSet};
