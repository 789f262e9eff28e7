// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable vector store on a WAL-mode SQLite file.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread; SQLite's own locking provides reader/writer isolation. Vectors are
//! stored as little-endian `f64` BLOBs next to the opaque payload so search
//! can run without decoding the payload.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use mnemo_core::types::VectorEntry;
use mnemo_core::{AdapterType, HealthStatus, MnemoError, PluginAdapter, VectorStore};

use crate::migrations::run_migrations;
use crate::search::{rank, validate_entry};

const UPSERT_SQL: &str = "INSERT INTO vector_entries (key, vector, metadata, updated_at) \
     VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')) \
     ON CONFLICT(key) DO UPDATE SET vector = excluded.vector, \
     metadata = excluded.metadata, updated_at = excluded.updated_at";

/// Helper to convert tokio_rusqlite errors into MnemoError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Errors raised while opening the connection, before the background thread runs.
fn open_err(e: rusqlite::Error) -> MnemoError {
    MnemoError::Storage {
        source: Box::new(e),
    }
}

/// Encode a vector as a little-endian f64 BLOB.
pub fn vec_to_blob(vec: &[f64]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decode a BLOB written by [`vec_to_blob`]. `None` if the length is not a
/// whole number of `f64`s.
pub fn blob_to_vec(blob: &[u8]) -> Option<Vec<f64>> {
    if blob.len() % 8 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                f64::from_le_bytes(bytes)
            })
            .collect(),
    )
}

/// A raw row before vector decoding.
type RawRow = (String, Vec<u8>, Vec<u8>);

fn read_raw(row: &rusqlite::Row) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

/// Decode raw rows, skipping any whose vector BLOB is corrupt.
fn decode_rows(rows: Vec<RawRow>) -> Vec<VectorEntry> {
    rows.into_iter()
        .filter_map(|(key, blob, metadata)| match blob_to_vec(&blob) {
            Some(vector) => Some(VectorEntry {
                key,
                vector,
                metadata,
            }),
            None => {
                warn!(key = %key, len = blob.len(), "skipping entry with malformed vector blob");
                None
            }
        })
        .collect()
}

/// SQLite-backed vector store.
pub struct SqliteVectorStore {
    conn: Connection,
    path: String,
    closed: AtomicBool,
}

impl SqliteVectorStore {
    /// Open (or create) the database at `path` and apply pending migrations.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MnemoError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| MnemoError::Storage {
                        source: Box::new(e),
                    })?;
            }
        }
        let conn = Connection::open(path).await.map_err(open_err)?;
        Self::initialize(conn, path.display().to_string()).await
    }

    /// Open a private in-memory database. Used by tests and ephemeral runs.
    pub async fn open_in_memory() -> Result<Self, MnemoError> {
        let conn = Connection::open_in_memory().await.map_err(open_err)?;
        Self::initialize(conn, ":memory:".to_string()).await
    }

    async fn initialize(conn: Connection, path: String) -> Result<Self, MnemoError> {
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            // journal_mode returns a row, so it cannot go through execute_batch.
            let _mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;
            conn.execute_batch("PRAGMA synchronous=NORMAL; PRAGMA busy_timeout=5000;")?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;

        conn.call(|conn| -> Result<(), MnemoError> { run_migrations(conn) })
            .await
            .map_err(|e: tokio_rusqlite::Error<MnemoError>| MnemoError::Storage {
                source: format!("migration failed: {e}").into(),
            })?;

        debug!(path = %path, "SQLite vector store opened");
        Ok(Self {
            conn,
            path,
            closed: AtomicBool::new(false),
        })
    }

    /// Path the store was opened from (`:memory:` for in-memory databases).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of stored entries.
    pub async fn len(&self) -> Result<usize, MnemoError> {
        self.ensure_open()?;
        let count: i64 = self
            .conn
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM vector_entries", [], |row| row.get(0))
            })
            .await
            .map_err(storage_err)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn ensure_open(&self) -> Result<(), MnemoError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MnemoError::Storage {
                source: "vector store is closed".into(),
            });
        }
        Ok(())
    }

    async fn load_embedded(&self) -> Result<Vec<VectorEntry>, MnemoError> {
        let rows = self
            .conn
            .call(|conn| -> Result<Vec<RawRow>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, vector, metadata FROM vector_entries WHERE length(vector) > 0",
                )?;
                let rows = stmt.query_map([], read_raw)?.collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;
        Ok(decode_rows(rows))
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(HealthStatus::Unhealthy("closed".into()));
        }
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        self.close().await
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn put(
        &self,
        key: &str,
        vector: Vec<f64>,
        metadata: Vec<u8>,
    ) -> Result<(), MnemoError> {
        self.ensure_open()?;
        validate_entry(key, &vector)?;
        let key = key.to_string();
        let blob = vec_to_blob(&vector);
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(UPSERT_SQL, rusqlite::params![key, blob, metadata])?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn get(&self, key: &str) -> Result<VectorEntry, MnemoError> {
        self.ensure_open()?;
        let lookup = key.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<RawRow>, rusqlite::Error> {
                conn.query_row(
                    "SELECT key, vector, metadata FROM vector_entries WHERE key = ?1",
                    rusqlite::params![lookup],
                    read_raw,
                )
                .optional()
            })
            .await
            .map_err(storage_err)?;

        let (key, blob, metadata) = row.ok_or_else(|| MnemoError::key_not_found(key))?;
        let vector = blob_to_vec(&blob).ok_or_else(|| MnemoError::Storage {
            source: format!("entry `{key}` has a malformed vector blob").into(),
        })?;
        Ok(VectorEntry {
            key,
            vector,
            metadata,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), MnemoError> {
        self.ensure_open()?;
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "DELETE FROM vector_entries WHERE key = ?1",
                    rusqlite::params![key],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn search(&self, query: &[f64], top_n: usize) -> Result<Vec<VectorEntry>, MnemoError> {
        self.ensure_open()?;
        let entries = self.load_embedded().await?;
        Ok(rank(&entries, query, top_n, None)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn search_with_threshold(
        &self,
        query: &[f64],
        top_n: usize,
        min_score: f64,
    ) -> Result<Vec<VectorEntry>, MnemoError> {
        self.ensure_open()?;
        let entries = self.load_embedded().await?;
        Ok(rank(&entries, query, top_n, Some(min_score))
            .into_iter()
            .cloned()
            .collect())
    }

    async fn batch_put(&self, entries: Vec<VectorEntry>) -> Result<(), MnemoError> {
        self.ensure_open()?;
        let valid: Vec<(String, Vec<u8>, Vec<u8>)> = entries
            .into_iter()
            .filter_map(|entry| match validate_entry(&entry.key, &entry.vector) {
                Ok(()) => Some((entry.key, vec_to_blob(&entry.vector), entry.metadata)),
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "skipping invalid entry in batch");
                    None
                }
            })
            .collect();
        if valid.is_empty() {
            return Ok(());
        }

        let written = self
            .conn
            .call(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let mut written = 0usize;
                {
                    let mut stmt = tx.prepare(UPSERT_SQL)?;
                    for (key, blob, metadata) in &valid {
                        match stmt.execute(rusqlite::params![key, blob, metadata]) {
                            Ok(_) => written += 1,
                            Err(e) => warn!(key = %key, error = %e, "batch row failed"),
                        }
                    }
                }
                tx.commit()?;
                Ok(written)
            })
            .await
            .map_err(storage_err)?;
        debug!(written, "batch put complete");
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<VectorEntry>, MnemoError> {
        self.ensure_open()?;
        let prefix = prefix.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<RawRow>, rusqlite::Error> {
                // substr keeps `%` and `_` literal, unlike LIKE.
                let mut stmt = conn.prepare(
                    "SELECT key, vector, metadata FROM vector_entries \
                     WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![prefix], read_raw)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;
        Ok(decode_rows(rows))
    }

    async fn close(&self) -> Result<(), MnemoError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))
            })
            .await
            .map_err(storage_err)?;
        debug!("WAL checkpoint complete");
        self.conn.clone().close().await.map_err(storage_err)?;
        debug!(path = %self.path, "SQLite vector store closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_roundtrip() {
        let original = vec![0.1, -2.5, 3.75, f64::MIN_POSITIVE];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), original.len() * 8);
        assert_eq!(blob_to_vec(&blob), Some(original));
    }

    #[test]
    fn empty_blob_is_empty_vector() {
        assert_eq!(blob_to_vec(&[]), Some(Vec::new()));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        assert_eq!(blob_to_vec(&[0u8; 7]), None);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        store
            .put("memory_1", vec![1.0, 0.0], b"ok".to_vec())
            .await
            .unwrap();
        store
            .conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO vector_entries (key, vector, metadata) VALUES ('memory_2', x'010203', x'00')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let scanned = store.scan("memory_").await.unwrap();
        assert_eq!(scanned.len(), 1);
        let found = store.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(matches!(
            store.get("memory_2").await,
            Err(MnemoError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn prefix_scan_treats_wildcards_literally() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        store.put("a%b", vec![1.0], Vec::new()).await.unwrap();
        store.put("axb", vec![1.0], Vec::new()).await.unwrap();
        let scanned = store.scan("a%").await.unwrap();
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].key, "a%b");
    }

    #[tokio::test]
    async fn len_counts_rows() {
        let store = SqliteVectorStore::open_in_memory().await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
        store.put("k", vec![], b"x".to_vec()).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unopenable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteVectorStore::open(dir.path()).await;
        assert!(matches!(result, Err(MnemoError::Storage { .. })));
    }

    #[tokio::test]
    async fn close_checkpoints_the_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");
        let store = SqliteVectorStore::open(&path).await.unwrap();
        store.put("k", vec![1.0, 2.0], b"x".to_vec()).await.unwrap();
        store.close().await.unwrap();

        let wal = dir.path().join("vectors.db-wal");
        assert!(!wal.exists() || std::fs::metadata(&wal).unwrap().len() == 0);

        let reopened = SqliteVectorStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap().vector, vec![1.0, 2.0]);
    }
}
