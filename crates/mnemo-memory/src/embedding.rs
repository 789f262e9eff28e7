// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LRU-cached embedding service.
//!
//! Wraps any [`EmbeddingProvider`] and memoizes vectors by exact input text.
//! The cache is shared by every clone of the service.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use mnemo_core::{AdapterType, EmbeddingProvider, HealthStatus, MnemoError, PluginAdapter};

use crate::metrics;

/// Default number of cached vectors.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Embedding provider front with a least-recently-used cache.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<Mutex<LruCache<String, Vec<f64>>>>,
}

impl EmbeddingService {
    /// A capacity of zero is treated as one.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            provider,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Service with the default capacity of 500 entries.
    pub fn with_default_capacity(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// Number of cached vectors.
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Drop every cached vector.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Embed `text`, consulting the cache first.
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>, MnemoError> {
        if text.trim().is_empty() {
            return Err(MnemoError::InvalidInput("cannot embed empty text".into()));
        }

        if let Some(hit) = self.lock_cache().get(text).cloned() {
            metrics::record_cache(true);
            return Ok(hit);
        }
        metrics::record_cache(false);

        // The lock is not held across the provider call.
        let vector = self.provider.generate_embedding(text).await?;
        self.lock_cache().put(text.to_string(), vector.clone());
        debug!(chars = text.chars().count(), dim = vector.len(), "embedding cached");
        Ok(vector)
    }

    /// Embed every text in order through the cache. The first failure aborts.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, MnemoError> {
        if texts.is_empty() {
            return Err(MnemoError::InvalidInput("empty embedding batch".into()));
        }
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, Vec<f64>>> {
        // A panic while holding the lock cannot leave the cache inconsistent.
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("provider", &self.provider.name())
            .field("cached", &self.cache_len())
            .finish()
    }
}

#[async_trait]
impl PluginAdapter for EmbeddingService {
    fn name(&self) -> &str {
        "embedding-service"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        self.provider.health_check().await
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        self.clear_cache();
        self.provider.shutdown().await
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, MnemoError> {
        self.embed(text).await
    }

    async fn generate_batch_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f64>>, MnemoError> {
        self.embed_batch(texts).await
    }
}
