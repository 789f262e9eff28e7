// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine wiring shared by the integration tests.

#![allow(dead_code)]

use mnemo_config::model::MemoryConfig;
use mnemo_core::MemoryPoint;
use mnemo_memory::codec::{encode_point, key_nanos, memory_key};
use mnemo_memory::{EmbeddingService, MemoryEngine};
use mnemo_test_utils::TestHarness;

/// Engine over the harness store with the axis embedder and no summarizer.
pub fn engine(h: &TestHarness) -> MemoryEngine {
    MemoryEngine::new(h.store.clone(), MemoryConfig::default())
        .with_embeddings(EmbeddingService::new(h.embedder.clone(), 500))
}

/// Engine with the axis embedder and the mock summarizer.
pub fn engine_with_summarizer(h: &TestHarness) -> MemoryEngine {
    MemoryEngine::new(h.store.clone(), MemoryConfig::default())
        .with_embeddings(EmbeddingService::new(h.embedder.clone(), 500))
        .with_summarizer(h.summarizer.clone())
}

/// Engine with no embedding service at all.
pub fn keyword_only_engine(h: &TestHarness) -> MemoryEngine {
    MemoryEngine::new(h.store.clone(), MemoryConfig::default())
}

/// Write a point straight to the store, bypassing deduplication.
/// Missing timestamps are set to now; the vector is taken from the embedder
/// when empty. Returns the key.
pub async fn insert_raw(h: &TestHarness, mut point: MemoryPoint) -> String {
    let now = chrono::Utc::now();
    point.created_at.get_or_insert(now);
    point.updated_at.get_or_insert(now);
    if point.vector.is_empty() {
        point.vector = h.embedder.embed(&point.embedding_text());
    }
    let key = memory_key(key_nanos(point.created_at.unwrap()) + point.id);
    h.store
        .put(&key, point.vector.clone(), encode_point(&point).unwrap())
        .await
        .unwrap();
    key
}
