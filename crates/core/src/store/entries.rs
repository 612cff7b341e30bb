//! Cache entry reads and writes.
//!
//! An entry pairs a request identity (method + canonical URL, hashed into a
//! content-addressed key) with an immutable response snapshot. Writes use
//! UPSERT semantics so the last write for a given identity wins, which is
//! what makes concurrent handlers safe without locking.

use super::connection::CacheStore;
use super::hash::compute_entry_key;
use crate::http::{Request, StoredResponse};
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

type EntryRow = (i64, String, Vec<u8>, String);

fn row_to_parts(row: &rusqlite::Row<'_>) -> Result<EntryRow, rusqlite::Error> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parts_to_response(
    (status, headers_json, body, stored_at): EntryRow,
) -> Result<StoredResponse, Error> {
    let headers: Vec<(String, String)> =
        serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    Ok(StoredResponse { status: status as u16, headers, body: Bytes::from(body), stored_at })
}

impl CacheStore {
    /// Insert or overwrite the entry for a request identity in a generation.
    ///
    /// Uses UPSERT semantics: inserts if the identity isn't present,
    /// replaces the whole snapshot if it is.
    pub async fn put_entry(
        &self,
        generation: &str,
        request: &Request,
        response: &StoredResponse,
    ) -> Result<(), Error> {
        let generation = generation.to_string();
        let method = request.method.as_str().to_string();
        let url = request.url.to_string();
        let entry_key = compute_entry_key(&method, &url);
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::CorruptEntry(e.to_string()))?;
        let status = response.status as i64;
        let body = response.body.to_vec();
        let stored_at = response.stored_at.clone();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        generation, entry_key, method, url,
                        status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(generation, entry_key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![generation, entry_key, method, url, status, headers_json, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request identity in one specific generation.
    pub async fn get_entry(
        &self,
        generation: &str,
        request: &Request,
    ) -> Result<Option<StoredResponse>, Error> {
        let generation = generation.to_string();
        let entry_key = compute_entry_key(request.method.as_str(), request.url.as_str());

        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND entry_key = ?2",
                    params![generation, entry_key],
                    row_to_parts,
                );
                match result {
                    Ok(parts) => Ok(Some(parts)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(parts_to_response).transpose()
    }

    /// Look up the entry for a request identity in any generation.
    ///
    /// Generations are scanned in creation order, so a precache entry wins
    /// over a runtime entry for the same identity.
    pub async fn match_any(&self, request: &Request) -> Result<Option<StoredResponse>, Error> {
        let entry_key = compute_entry_key(request.method.as_str(), request.url.as_str());

        let row = self
            .conn
            .call(move |conn| -> Result<Option<EntryRow>, Error> {
                let result = conn.query_row(
                    "SELECT e.status, e.headers_json, e.body, e.stored_at
                     FROM entries e
                     JOIN generations g ON g.name = e.generation
                     WHERE e.entry_key = ?1
                     ORDER BY g.rowid
                     LIMIT 1",
                    params![entry_key],
                    row_to_parts,
                );
                match result {
                    Ok(parts) => Ok(Some(parts)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(parts_to_response).transpose()
    }

    /// Delete entries stored before the cutoff, across all generations.
    ///
    /// Returns the number of deleted entries. Maintenance only; request
    /// handling never expires entries.
    pub async fn purge_older_than(
        &self,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, Error> {
        let cutoff = cutoff.to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE stored_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
