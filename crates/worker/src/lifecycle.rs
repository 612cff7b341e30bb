//! Install/activate lifecycle for cache generations.
//!
//! A worker instance moves `Installing -> Installed -> Activating ->
//! Activated` and stays activated until a newer instance goes through the
//! same states on its own. Install populates the precache all-or-nothing;
//! activation sweeps every generation whose name is not in the current set.

use umbra_client::Fetch;
use umbra_core::{CacheStore, Error, GenerationSet, Request};
use url::Url;

/// Lifecycle states of a worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
}

/// Populate the precache generation from the asset manifest.
///
/// All-or-nothing: if any asset fails to fetch or store, the partially
/// populated precache generation is dropped and the install fails.
///
/// # Errors
///
/// Returns `Error::InstallFailed` naming the offending asset.
pub async fn install(
    store: &CacheStore,
    fetcher: &dyn Fetch,
    origin: &Url,
    precache: &str,
    manifest: &[String],
) -> Result<(), Error> {
    tracing::info!(generation = precache, assets = manifest.len(), "installing precache");

    store.ensure_generation(precache).await?;

    if let Err(err) = populate(store, fetcher, origin, precache, manifest).await {
        if let Err(cleanup) = store.delete_generation(precache).await {
            tracing::warn!(generation = precache, error = %cleanup, "failed to drop partial precache");
        }
        return Err(err);
    }

    Ok(())
}

async fn populate(
    store: &CacheStore,
    fetcher: &dyn Fetch,
    origin: &Url,
    precache: &str,
    manifest: &[String],
) -> Result<(), Error> {
    for path in manifest {
        let url = origin
            .join(path)
            .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;
        let request = Request::get(url);

        let resp = fetcher
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;
        if !resp.is_ok() {
            return Err(Error::InstallFailed(format!("{path}: status {}", resp.status)));
        }

        store
            .put_entry(precache, &request, &resp.into())
            .await
            .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;
    }

    Ok(())
}

/// Bring the current generation set live and sweep superseded generations.
///
/// Ensures all three current generations exist (the runtime and API
/// generations are created here, after the precache), then deletes every
/// generation whose name is not in the set. Returns the deleted names.
pub async fn activate(
    store: &CacheStore,
    generations: &GenerationSet,
) -> Result<Vec<String>, Error> {
    for name in generations.names() {
        store.ensure_generation(name).await?;
    }

    let mut deleted = Vec::new();
    for name in store.generation_names().await? {
        if !generations.contains(&name) {
            tracing::info!(generation = %name, "deleting old cache generation");
            store.delete_generation(&name).await?;
            deleted.push(name);
        }
    }

    Ok(deleted)
}
