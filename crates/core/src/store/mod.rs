//! SQLite-backed cache store with versioned generations.
//!
//! This module provides the persistent key-value store the worker caches
//! into, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named cache generations created on install and swept on activation
//! - Content-addressed entries keyed by SHA-256 over (method, URL)
//! - UPSERT writes (at most one entry per generation and request identity)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheStore;
pub use generations::GenerationSet;
