// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile vector store backed by a `HashMap` behind a read-write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mnemo_core::types::VectorEntry;
use mnemo_core::{AdapterType, HealthStatus, MnemoError, PluginAdapter, VectorStore};

use crate::search::{rank, validate_entry};

/// In-process vector store. Contents live for the lifetime of the value.
///
/// Readers (`get`, `search`, `scan`) share the lock; writers (`put`,
/// `delete`, `batch_put`) hold it exclusively.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, VectorEntry>>,
    closed: AtomicBool,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn ensure_open(&self) -> Result<(), MnemoError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MnemoError::Storage {
                source: "vector store is closed".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for InMemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
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
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        self.close().await
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn put(
        &self,
        key: &str,
        vector: Vec<f64>,
        metadata: Vec<u8>,
    ) -> Result<(), MnemoError> {
        self.ensure_open()?;
        validate_entry(key, &vector)?;
        let entry = VectorEntry::new(key, vector, metadata);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<VectorEntry, MnemoError> {
        self.ensure_open()?;
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| MnemoError::key_not_found(key))
    }

    async fn delete(&self, key: &str) -> Result<(), MnemoError> {
        self.ensure_open()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn search(&self, query: &[f64], top_n: usize) -> Result<Vec<VectorEntry>, MnemoError> {
        self.ensure_open()?;
        let entries = self.entries.read().await;
        Ok(rank(entries.values(), query, top_n, None)
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
        let entries = self.entries.read().await;
        Ok(rank(entries.values(), query, top_n, Some(min_score))
            .into_iter()
            .cloned()
            .collect())
    }

    async fn batch_put(&self, batch: Vec<VectorEntry>) -> Result<(), MnemoError> {
        self.ensure_open()?;
        let mut entries = self.entries.write().await;
        let mut skipped = 0usize;
        for entry in batch {
            if let Err(e) = validate_entry(&entry.key, &entry.vector) {
                warn!(key = %entry.key, error = %e, "skipping invalid entry in batch");
                skipped += 1;
                continue;
            }
            entries.insert(entry.key.clone(), entry);
        }
        debug!(skipped, "batch put complete");
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<VectorEntry>, MnemoError> {
        self.ensure_open()?;
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<(), MnemoError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.entries.write().await.clear();
            debug!("in-memory vector store closed");
        }
        Ok(())
    }
}
