// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store trait: keyed vectors with an opaque payload.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::VectorEntry;

/// Durable key to (vector, payload) storage with linear-scan similarity search.
///
/// The store never interprets `metadata`. An empty vector is a valid value
/// meaning "unembedded"; such entries are kept but never match a search.
#[async_trait]
pub trait VectorStore: PluginAdapter {
    /// Insert or replace the entry under `key`.
    ///
    /// Rejects an empty key or a vector containing NaN or infinity.
    async fn put(&self, key: &str, vector: Vec<f64>, metadata: Vec<u8>)
    -> Result<(), MnemoError>;

    /// Fetch one entry. Absent keys yield [`MnemoError::NotFound`].
    async fn get(&self, key: &str) -> Result<VectorEntry, MnemoError>;

    /// Remove an entry. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), MnemoError>;

    /// Top `top_n` entries by cosine similarity, best first.
    ///
    /// An empty `query` returns up to `top_n` arbitrary entries that carry a vector.
    async fn search(&self, query: &[f64], top_n: usize) -> Result<Vec<VectorEntry>, MnemoError>;

    /// Like [`VectorStore::search`], excluding entries scoring below `min_score`
    /// before truncation.
    async fn search_with_threshold(
        &self,
        query: &[f64],
        top_n: usize,
        min_score: f64,
    ) -> Result<Vec<VectorEntry>, MnemoError>;

    /// Best-effort bulk upsert. Invalid entries are skipped, not fatal.
    async fn batch_put(&self, entries: Vec<VectorEntry>) -> Result<(), MnemoError>;

    /// Every entry whose key starts with `prefix`. Empty prefix returns all.
    async fn scan(&self, prefix: &str) -> Result<Vec<VectorEntry>, MnemoError>;

    /// Release backend resources. Later operations fail with a storage error.
    async fn close(&self) -> Result<(), MnemoError>;
}
