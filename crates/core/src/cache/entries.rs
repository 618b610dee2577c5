//! Cache store operations.
//!
//! A cache store is identified by name (one per deployment generation) and
//! maps request identity to a stored response. Stores are filled in one
//! transaction and dropped wholesale; there is no per-entry expiry.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::{Error, Request, Response};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// Metadata of a stored entry, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedEntry {
    pub cache_name: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub stored_at: String,
    pub body_bytes: u64,
}

/// Row prepared outside the connection thread.
struct EntryRow {
    key_hash: String,
    url: String,
    method: String,
    status: u16,
    content_type: Option<String>,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Self {
        let mut url = request.url.clone();
        url.set_fragment(None);
        Self {
            key_hash: compute_cache_key(&request.method, &request.url),
            url: url.to_string(),
            method: request.method.clone(),
            status: response.status,
            content_type: response.content_type.clone(),
            headers_json: serde_json::to_string(&response.headers).unwrap_or_default(),
            body: response.body.to_vec(),
        }
    }
}

impl CacheDb {
    /// Names of all cache stores, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Store every request/response pair in the named cache, all or nothing.
    ///
    /// The store is created if absent. Existing entries with the same request
    /// identity are replaced. If any insert fails the transaction is rolled
    /// back and the store is left exactly as it was.
    pub async fn put_all(&self, cache_name: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let cache_name = cache_name.to_string();
        let rows: Vec<EntryRow> = entries.iter().map(|(req, res)| EntryRow::new(req, res)).collect();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let now = chrono::Utc::now().to_rfc3339();
                tx.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![&cache_name, &now],
                )?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO cache_entries (
                            cache_name, key_hash, url, method, status,
                            content_type, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                        ON CONFLICT(cache_name, key_hash) DO UPDATE SET
                            url = excluded.url,
                            method = excluded.method,
                            status = excluded.status,
                            content_type = excluded.content_type,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                    )?;
                    for row in &rows {
                        stmt.execute(params![
                            &cache_name,
                            &row.key_hash,
                            &row.url,
                            &row.method,
                            row.status,
                            &row.content_type,
                            &row.headers_json,
                            &row.body,
                            &now,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request.
    ///
    /// Only `GET` requests ever match. The URL fragment is ignored.
    pub async fn match_request(&self, cache_name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if request.method != "GET" {
            return Ok(None);
        }
        let cache_name = cache_name.to_string();
        let key_hash = compute_cache_key(&request.method, &request.url);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn
                    .query_row(
                        "SELECT url, status, content_type, headers_json, body
                         FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2",
                        params![cache_name, key_hash],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, u16>(1)?,
                                row.get::<_, Option<String>>(2)?,
                                row.get::<_, Option<String>>(3)?,
                                row.get::<_, Vec<u8>>(4)?,
                            ))
                        },
                    )
                    .optional()?;

                Ok(row.map(|(url, status, content_type, headers_json, body)| Response {
                    url,
                    status,
                    content_type,
                    headers: headers_json
                        .and_then(|j| serde_json::from_str(&j).ok())
                        .unwrap_or_default(),
                    body: Bytes::from(body),
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Whether every request has a stored response in the named store.
    ///
    /// Non-`GET` requests never match, so their presence makes this false.
    pub async fn contains_all(&self, cache_name: &str, requests: &[Request]) -> Result<bool, Error> {
        if requests.iter().any(|r| r.method != "GET") {
            return Ok(false);
        }
        let cache_name = cache_name.to_string();
        let key_hashes: Vec<String> = requests.iter().map(|r| compute_cache_key(&r.method, &r.url)).collect();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let mut stmt =
                    conn.prepare("SELECT EXISTS(SELECT 1 FROM cache_entries WHERE cache_name = ?1 AND key_hash = ?2)")?;
                for key_hash in &key_hashes {
                    let found: bool = stmt.query_row(params![&cache_name, key_hash], |row| row.get(0))?;
                    if !found {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the named store (0 if the store does not exist).
    pub async fn entry_count(&self, cache_name: &str) -> Result<u64, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1",
                    params![cache_name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Metadata of every entry in the named store, ordered by URL.
    pub async fn entries(&self, cache_name: &str) -> Result<Vec<CachedEntry>, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT cache_name, url, method, status, content_type, stored_at, LENGTH(body)
                     FROM cache_entries WHERE cache_name = ?1 ORDER BY url ASC",
                )?;
                let entries = stmt
                    .query_map(params![cache_name], |row| {
                        Ok(CachedEntry {
                            cache_name: row.get(0)?,
                            url: row.get(1)?,
                            method: row.get(2)?,
                            status: row.get(3)?,
                            content_type: row.get(4)?,
                            stored_at: row.get(5)?,
                            body_bytes: row.get::<_, i64>(6)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a cache store and all its entries.
    ///
    /// Returns false if no store with that name existed.
    pub async fn delete_cache(&self, cache_name: &str) -> Result<bool, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM caches WHERE name = ?1", params![cache_name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every cache store except `keep`.
    ///
    /// Returns the names of the deleted stores.
    pub async fn delete_caches_except(&self, keep: &str) -> Result<Vec<String>, Error> {
        let keep = keep.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let tx = conn.transaction()?;
                let stale = {
                    let mut stmt = tx.prepare("SELECT name FROM caches WHERE name <> ?1 ORDER BY name ASC")?;
                    stmt.query_map(params![&keep], |row| row.get(0))?
                        .collect::<Result<Vec<String>, _>>()?
                };
                tx.execute("DELETE FROM caches WHERE name <> ?1", params![&keep])?;
                tx.commit()?;
                Ok(stale)
            })
            .await
            .map_err(Error::from)
    }
}
