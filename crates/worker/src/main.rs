//! umbra worker entry point.
//!
//! Boots the worker against the configured origin: opens the cache store,
//! installs the precache, activates (sweeping superseded generations), and
//! reports the resulting cache state. Any paths or URLs given on the
//! command line are then served through the worker as document navigations,
//! one JSON line each on stdout. Logging goes to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use umbra_client::{FetchClient, FetchConfig, canonicalize};
use umbra_core::{AppConfig, CacheStore, Request};
use umbra_worker::Worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(origin = %config.origin, db = %config.db_path.display(), "starting umbra worker");

    let store = CacheStore::open(&config.db_path).await?;

    let fetch_config = FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..Default::default()
    };
    let fetcher = FetchClient::new(fetch_config)?;
    tracing::info!(
        user_agent = %fetcher.config().user_agent,
        timeout_ms = fetcher.config().timeout.as_millis() as u64,
        max_bytes = fetcher.config().max_bytes,
        "fetch client ready"
    );
    let fetcher = Arc::new(fetcher);

    let mut worker = Worker::new(store.clone(), fetcher, &config)?;
    worker.start().await?;

    for name in worker.generations().names() {
        let entries = store.entry_count(name).await?;
        tracing::info!(generation = name, entries, "generation ready");
    }

    let origin = config.origin_url()?;
    for arg in std::env::args().skip(1) {
        // root-relative paths resolve against the origin; anything else is
        // taken as a full URL
        let url = if arg.starts_with('/') {
            origin.join(&arg)?
        } else {
            canonicalize(&arg)?
        };
        let response = worker.handle(Request::navigation(url)).await;
        println!(
            "{}",
            serde_json::json!({
                "path": arg,
                "status": response.status,
                "source": response.source.as_str(),
                "bytes": response.body.len(),
            })
        );
    }

    Ok(())
}
