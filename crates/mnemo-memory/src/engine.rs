// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory facade: record, search, cleanup, consolidation, and weight
//! adjustment over a [`VectorStore`].
//!
//! Embedding and summarization are optional collaborators. When either is
//! missing or failing the engine degrades (keyword-only search, heuristic
//! summaries, unembedded writes) instead of returning an error. Storage
//! errors always propagate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use mnemo_config::model::MemoryConfig;
use mnemo_core::types::clamp_total_weight;
use mnemo_core::vector::cosine_similarity;
use mnemo_core::{
    ConsolidationReport, ConversationLog, Memory, MemoryPoint, MnemoError, Scene, Summarizer,
    VectorStore,
};

use crate::codec::{KEY_PREFIX, StoredPoint, decode_entry, encode_point, key_nanos, memory_key};
use crate::dedup::merge_points;
use crate::embedding::EmbeddingService;
use crate::text::{keyword_overlap, normalize_keywords};
use crate::{consolidation, metrics, weights};

/// Long-term memory engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct MemoryEngine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn VectorStore>,
    embeddings: Option<EmbeddingService>,
    summarizer: Option<Arc<dyn Summarizer>>,
    config: MemoryConfig,
    /// Last assigned point id, seeded from the store on first use.
    last_id: Mutex<Option<i64>>,
    cleanup_running: AtomicBool,
}

impl MemoryEngine {
    pub fn new(store: Arc<dyn VectorStore>, config: MemoryConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                embeddings: None,
                summarizer: None,
                config,
                last_id: Mutex::new(None),
                cleanup_running: AtomicBool::new(false),
            }),
        }
    }

    /// Attach an embedding service. Must be called before the engine is cloned.
    pub fn with_embeddings(mut self, embeddings: EmbeddingService) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.embeddings = Some(embeddings);
        } else {
            warn!("engine already shared, embedding service not attached");
        }
        self
    }

    /// Attach a summarizer. Must be called before the engine is cloned.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.summarizer = Some(summarizer);
        } else {
            warn!("engine already shared, summarizer not attached");
        }
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.inner.store
    }

    pub fn embeddings(&self) -> Option<&EmbeddingService> {
        self.inner.embeddings.as_ref()
    }

    pub(crate) fn summarizer(&self) -> Option<&Arc<dyn Summarizer>> {
        self.inner.summarizer.as_ref()
    }

    /// Fill the weight components of `point` from `text` as of `now`.
    ///
    /// Recency is measured from `updated_at`, falling back to `created_at`.
    /// Repetition is scored against up to `scan_limit` stored points.
    pub async fn weigh(
        &self,
        point: &mut MemoryPoint,
        text: &str,
        scene: Scene,
        now: DateTime<Utc>,
    ) -> Result<(), MnemoError> {
        let existing = self.repeat_candidates().await?;
        self.weigh_against(point, text, scene, now, &existing);
        Ok(())
    }

    pub(crate) fn weigh_against(
        &self,
        point: &mut MemoryPoint,
        text: &str,
        scene: Scene,
        now: DateTime<Utc>,
        existing: &[MemoryPoint],
    ) {
        let at = point.updated_at.or(point.created_at).unwrap_or(now);
        point.time_weight = weights::time_weight(at, now);
        point.repeat_weight = weights::repeat_weight(text, existing);
        point.emphasis_weight = weights::emphasis_weight(text);
        point.total_weight = clamp_total_weight(weights::total_weight(
            point.time_weight,
            point.repeat_weight,
            point.emphasis_weight,
            scene,
        ));
    }

    /// Points considered for repetition scoring.
    pub(crate) async fn repeat_candidates(&self) -> Result<Vec<MemoryPoint>, MnemoError> {
        let entries = self
            .inner
            .store
            .search(&[], self.inner.config.scan_limit)
            .await?;
        Ok(entries
            .iter()
            .filter(|e| e.key.starts_with(KEY_PREFIX))
            .filter_map(|e| decode_entry(e).ok())
            .collect())
    }

    /// Every stored memory point with its key. Undecodable payloads are skipped.
    pub(crate) async fn load_stored(&self) -> Result<Vec<StoredPoint>, MnemoError> {
        let entries = self.inner.store.scan(KEY_PREFIX).await?;
        let mut points = Vec::with_capacity(entries.len());
        for entry in &entries {
            match decode_entry(entry) {
                Ok(point) => points.push(StoredPoint {
                    key: entry.key.clone(),
                    point,
                }),
                Err(e) => debug!(key = %entry.key, error = %e, "skipping malformed memory payload"),
            }
        }
        Ok(points)
    }

    /// All stored points, oldest first.
    pub async fn all_memories(&self) -> Result<Vec<MemoryPoint>, MnemoError> {
        let mut points: Vec<MemoryPoint> = self
            .load_stored()
            .await?
            .into_iter()
            .map(|s| s.point)
            .collect();
        points.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(points)
    }

    async fn next_id(&self) -> Result<i64, MnemoError> {
        let mut last = self.inner.last_id.lock().await;
        let current = match *last {
            Some(id) => id,
            None => self
                .load_stored()
                .await?
                .iter()
                .map(|s| s.point.id)
                .max()
                .unwrap_or(0)
                .max(0),
        };
        let id = current + 1;
        *last = Some(id);
        Ok(id)
    }

    /// Keep caller-chosen ids from being handed out again.
    async fn observe_id(&self, id: i64) {
        let mut last = self.inner.last_id.lock().await;
        if let Some(current) = *last {
            *last = Some(current.max(id));
        }
    }

    /// Embed `point` if it has no vector. Failures leave it unembedded.
    async fn ensure_vector(&self, point: &mut MemoryPoint) {
        if !point.vector.is_empty() {
            return;
        }
        let Some(embeddings) = &self.inner.embeddings else {
            return;
        };
        let text = point.embedding_text();
        if text.is_empty() {
            return;
        }
        match embeddings.embed(&text).await {
            Ok(vector) => point.vector = vector,
            Err(e) => warn!(error = %e, "embedding failed, storing point without vector"),
        }
    }

    /// Nearest stored point at or above the dedup threshold.
    async fn find_duplicate(&self, vector: &[f64]) -> Result<Option<StoredPoint>, MnemoError> {
        if vector.is_empty() {
            return Ok(None);
        }
        let hits = self
            .inner
            .store
            .search_with_threshold(vector, 1, self.inner.config.dedup_threshold)
            .await?;
        let Some(hit) = hits.into_iter().find(|e| e.key.starts_with(KEY_PREFIX)) else {
            return Ok(None);
        };
        match decode_entry(&hit) {
            Ok(point) => Ok(Some(StoredPoint {
                key: hit.key,
                point,
            })),
            Err(e) => {
                warn!(key = %hit.key, error = %e, "near-duplicate has malformed payload, ignoring");
                Ok(None)
            }
        }
    }

    /// First free `memory_<nanos>` key at or after `nanos`.
    async fn free_key(&self, mut nanos: i64) -> Result<String, MnemoError> {
        loop {
            let key = memory_key(nanos);
            match self.inner.store.get(&key).await {
                Err(e) if e.is_not_found() => return Ok(key),
                Err(e) => return Err(e),
                Ok(_) => nanos = nanos.saturating_add(1),
            }
        }
    }

    async fn persist(&self, key: &str, point: &MemoryPoint) -> Result<(), MnemoError> {
        let payload = encode_point(point)?;
        self.inner
            .store
            .put(key, point.vector.clone(), payload)
            .await
    }

    /// Record `point` and return the key it was stored under.
    pub async fn record_point(&self, mut point: MemoryPoint) -> Result<String, MnemoError> {
        let now = Utc::now();
        point.keywords = normalize_keywords(&point.keywords);
        point.created_at.get_or_insert(now);
        point.updated_at.get_or_insert(now);
        self.ensure_vector(&mut point).await;

        let key = match self.find_duplicate(&point.vector).await? {
            Some(existing) => {
                let merged = merge_points(&existing.point, &point, now);
                self.persist(&existing.key, &merged).await?;
                metrics::record_write(true);
                info!(key = %existing.key, id = merged.id, "merged into existing memory");
                existing.key
            }
            None => {
                if point.id == 0 {
                    point.id = self.next_id().await?;
                } else {
                    self.observe_id(point.id).await;
                }
                let created = point.created_at.unwrap_or(now);
                let key = self.free_key(key_nanos(created)).await?;
                self.persist(&key, &point).await?;
                metrics::record_write(false);
                info!(key = %key, id = point.id, embedded = !point.vector.is_empty(), "memory recorded");
                key
            }
        };

        self.spawn_cleanup();
        Ok(key)
    }

    /// Run cleanup in the background unless one is already running.
    fn spawn_cleanup(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no tokio runtime, skipping background cleanup");
            return;
        };
        if self.inner.cleanup_running.swap(true, Ordering::AcqRel) {
            return;
        }
        let engine = self.clone();
        handle.spawn(async move {
            if let Err(e) = engine.cleanup_expired().await {
                error!(error = %e, "background cleanup failed");
            }
            engine.inner.cleanup_running.store(false, Ordering::Release);
        });
    }

    /// Delete invalid points and points that are both light and old.
    /// Returns the number of deleted points.
    pub async fn cleanup_expired(&self) -> Result<usize, MnemoError> {
        let now = Utc::now();
        let max_age =
            Duration::try_days(self.inner.config.cleanup_max_age_days).unwrap_or(Duration::MAX);
        let min_weight = self.inner.config.cleanup_min_weight;

        let mut deleted = 0;
        for stored in self.load_stored().await? {
            let point = &stored.point;
            let expired = point.total_weight < min_weight
                && point
                    .created_at
                    .or(point.updated_at)
                    .is_some_and(|at| now - at > max_age);
            if point.is_invalid() || expired {
                self.inner.store.delete(&stored.key).await?;
                debug!(key = %stored.key, invalid = point.is_invalid(), "memory removed");
                deleted += 1;
            }
        }

        metrics::record_cleanup(deleted);
        if deleted > 0 {
            info!(deleted, "memory cleanup finished");
        }
        Ok(deleted)
    }

    /// Multiply a point's total weight, clamped to `[0.1, 3.0]`.
    pub async fn adjust_memory_weight(
        &self,
        id: i64,
        multiplier: f64,
    ) -> Result<MemoryPoint, MnemoError> {
        if !multiplier.is_finite() {
            return Err(MnemoError::InvalidInput(format!(
                "weight multiplier must be finite, got {multiplier}"
            )));
        }

        let stored = self
            .load_stored()
            .await?
            .into_iter()
            .find(|s| s.point.id == id)
            .ok_or_else(|| MnemoError::NotFound {
                kind: "memory point",
                key: id.to_string(),
            })?;

        let mut point = stored.point;
        point.total_weight = clamp_total_weight(point.total_weight * multiplier);
        point.updated_at = Some(Utc::now());
        self.persist(&stored.key, &point).await?;
        info!(id, weight = point.total_weight, "memory weight adjusted");
        Ok(point)
    }

    /// Query the store for points relevant to `terms`.
    pub async fn search_points(&self, terms: &str) -> Result<Vec<MemoryPoint>, MnemoError> {
        if terms.trim().is_empty() {
            return Ok(Vec::new());
        }
        let config = &self.inner.config;

        let query = match &self.inner.embeddings {
            Some(embeddings) => match embeddings.embed(terms).await {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!(error = %e, "query embedding failed, using keyword matching only");
                    None
                }
            },
            None => None,
        };

        let candidates = self.load_stored().await?.into_iter().map(|s| s.point);
        let mut hits: Vec<MemoryPoint> = match &query {
            Some(vector) => candidates
                .filter(|p| cosine_similarity(vector, &p.vector) >= config.search_similarity_threshold)
                .collect(),
            None => candidates.collect(),
        };
        hits.retain(|p| keyword_overlap(&p.keywords, terms) >= config.keyword_match_threshold);
        hits.sort_by(|a, b| {
            b.total_weight
                .partial_cmp(&a.total_weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(config.search_limit);

        metrics::record_search(if query.is_some() { "vector" } else { "keyword" });
        debug!(terms, results = hits.len(), "memory search finished");
        Ok(hits)
    }

    /// Close the underlying store.
    pub async fn close(&self) -> Result<(), MnemoError> {
        self.inner.store.close().await
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("store", &self.inner.store.name())
            .field("embeddings", &self.inner.embeddings)
            .field(
                "summarizer",
                &self.inner.summarizer.as_ref().map(|s| s.name().to_string()),
            )
            .finish()
    }
}

#[async_trait]
impl Memory for MemoryEngine {
    async fn record(&self, point: MemoryPoint) -> Result<(), MnemoError> {
        self.record_point(point).await.map(|_| ())
    }

    async fn search(&self, terms: &str) -> Result<Vec<MemoryPoint>, MnemoError> {
        self.search_points(terms).await
    }

    async fn optimize(&self) -> Result<(), MnemoError> {
        self.cleanup_expired().await.map(|_| ())
    }

    async fn cluster_conversations(
        &self,
        logs: &[ConversationLog],
    ) -> Result<ConsolidationReport, MnemoError> {
        consolidation::consolidate(self, logs).await
    }
}
