//! Cache generation management.
//!
//! Generations are named buckets of entries. Three coexist at any version:
//! a precache (static shell), a runtime cache (general dynamic assets), and
//! an API cache (service responses). Superseded generations are deleted
//! only during activation of a new version.

use super::connection::CacheStore;
use crate::Error;
use tokio_rusqlite::params;

/// The three current generation names for a given prefix and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSet {
    pub precache: String,
    pub runtime: String,
    pub api: String,
}

impl GenerationSet {
    /// Derive the version-stamped names from a prefix and version number.
    pub fn new(prefix: &str, version: u32) -> Self {
        Self {
            precache: format!("{prefix}-v{version}"),
            runtime: format!("{prefix}-runtime-v{version}"),
            api: format!("{prefix}-api-v{version}"),
        }
    }

    /// All three names, precache first.
    pub fn names(&self) -> [&str; 3] {
        [&self.precache, &self.runtime, &self.api]
    }

    /// Whether a stored generation name belongs to the current set.
    pub fn contains(&self, name: &str) -> bool {
        self.names().contains(&name)
    }
}

impl CacheStore {
    /// Create a generation if it doesn't exist yet.
    ///
    /// Creation order matters: lookups across generations scan them in the
    /// order they were created, so the precache is opened first.
    pub async fn ensure_generation(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO generations (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All generation names currently present, in creation order.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY rowid")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and all its entries.
    ///
    /// Returns true if the generation existed.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted =
                    conn.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a generation.
    pub async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
