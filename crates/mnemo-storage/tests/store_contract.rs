// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioural contract shared by every vector store backend.
//!
//! Each check is written once against `&dyn VectorStore` and run against
//! both the in-memory and the SQLite implementation.

use mnemo_core::vector::cosine_similarity;
use mnemo_core::{VectorEntry, VectorStore};
use mnemo_storage::{InMemoryVectorStore, SqliteVectorStore};

/// A unit vector in 2D whose cosine with `[1, 0]` is exactly `score`.
fn at_score(score: f64) -> Vec<f64> {
    vec![score, (1.0 - score * score).sqrt()]
}

async fn backends() -> Vec<(&'static str, Box<dyn VectorStore>)> {
    vec![
        ("memory", Box::new(InMemoryVectorStore::new())),
        (
            "sqlite",
            Box::new(SqliteVectorStore::open_in_memory().await.expect("open sqlite")),
        ),
    ]
}

#[tokio::test]
async fn put_get_round_trip_preserves_payload() {
    for (name, store) in backends().await {
        let payload = serde_json::json!({"content": "user is a Go developer", "keywords": ["go"]});
        let bytes = serde_json::to_vec(&payload).unwrap();
        store
            .put("memory_1", vec![0.25, -0.5, 1.0], bytes)
            .await
            .unwrap();

        let entry = store.get("memory_1").await.unwrap();
        assert_eq!(entry.key, "memory_1", "{name}");
        assert_eq!(entry.vector, vec![0.25, -0.5, 1.0], "{name}");
        let decoded: serde_json::Value = serde_json::from_slice(&entry.metadata).unwrap();
        assert_eq!(decoded, payload, "{name}");
    }
}

#[tokio::test]
async fn get_missing_key_is_not_found() {
    for (name, store) in backends().await {
        let err = store.get("memory_404").await.unwrap_err();
        assert!(err.is_not_found(), "{name}: {err}");
    }
}

#[tokio::test]
async fn delete_is_idempotent() {
    for (name, store) in backends().await {
        store.put("k", vec![1.0], Vec::new()).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap_err().is_not_found(), "{name}");
    }
}

#[tokio::test]
async fn put_rejects_invalid_entries() {
    for (name, store) in backends().await {
        assert!(store.put("", vec![1.0], Vec::new()).await.is_err(), "{name}");
        assert!(
            store.put("k", vec![f64::NAN], Vec::new()).await.is_err(),
            "{name}"
        );
        store.put("unembedded", Vec::new(), Vec::new()).await.unwrap();
    }
}

#[tokio::test]
async fn search_returns_top_n_in_descending_order() {
    for (name, store) in backends().await {
        for (i, score) in [0.1, 0.9, 0.5, 0.7, 0.3].iter().enumerate() {
            store
                .put(&format!("memory_{i}"), at_score(*score), Vec::new())
                .await
                .unwrap();
        }
        store.put("memory_empty", Vec::new(), Vec::new()).await.unwrap();

        let query = [1.0, 0.0];
        let found = store.search(&query, 3).await.unwrap();
        assert_eq!(found.len(), 3, "{name}");
        let scores: Vec<f64> = found
            .iter()
            .map(|e| cosine_similarity(&query, &e.vector))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{name}: {scores:?}");
        assert!((scores[0] - 0.9).abs() < 1e-9, "{name}");
    }
}

#[tokio::test]
async fn threshold_excludes_low_scores() {
    for (name, store) in backends().await {
        store.put("high", at_score(0.95), Vec::new()).await.unwrap();
        store.put("low", at_score(0.3), Vec::new()).await.unwrap();

        let found = store
            .search_with_threshold(&[1.0, 0.0], 10, 0.9)
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "{name}");
        assert_eq!(found[0].key, "high", "{name}");

        let looser = store
            .search_with_threshold(&[1.0, 0.0], 10, 0.2)
            .await
            .unwrap();
        assert!(looser.len() >= found.len(), "{name}");
    }
}

#[tokio::test]
async fn empty_query_returns_arbitrary_embedded_candidates() {
    for (name, store) in backends().await {
        store.put("a", vec![1.0, 0.0], Vec::new()).await.unwrap();
        store.put("b", vec![0.0, 1.0], Vec::new()).await.unwrap();
        store.put("c", Vec::new(), Vec::new()).await.unwrap();

        let found = store.search(&[], 10).await.unwrap();
        let mut keys: Vec<String> = found.into_iter().map(|e| e.key).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"], "{name}");

        assert_eq!(store.search(&[], 1).await.unwrap().len(), 1, "{name}");
    }
}

#[tokio::test]
async fn batch_put_is_best_effort() {
    for (name, store) in backends().await {
        store
            .batch_put(vec![
                VectorEntry::new("memory_1", vec![1.0], b"one".to_vec()),
                VectorEntry::new("", vec![1.0], b"bad key".to_vec()),
                VectorEntry::new("memory_2", vec![f64::INFINITY], b"bad vector".to_vec()),
                VectorEntry::new("memory_3", vec![0.5], b"three".to_vec()),
            ])
            .await
            .unwrap();

        let mut keys: Vec<String> = store
            .scan("")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["memory_1", "memory_3"], "{name}");
    }
}

#[tokio::test]
async fn scan_filters_by_prefix() {
    for (name, store) in backends().await {
        store.put("memory_1", vec![1.0], Vec::new()).await.unwrap();
        store.put("memory_2", Vec::new(), Vec::new()).await.unwrap();
        store.put("other_1", vec![1.0], Vec::new()).await.unwrap();

        assert_eq!(store.scan("memory_").await.unwrap().len(), 2, "{name}");
        assert_eq!(store.scan("").await.unwrap().len(), 3, "{name}");
        assert!(store.scan("nothing").await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn close_twice_is_safe_and_blocks_further_use() {
    for (name, store) in backends().await {
        store.put("k", vec![1.0], Vec::new()).await.unwrap();
        store.close().await.unwrap();
        store.close().await.unwrap();
        assert!(store.get("k").await.is_err(), "{name}");
        assert!(store.scan("").await.is_err(), "{name}");
    }
}

#[tokio::test]
async fn sqlite_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/memory.db");

    {
        let store = SqliteVectorStore::open(&path).await.unwrap();
        store
            .put("memory_1", vec![1.0, 2.0], b"durable".to_vec())
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let reopened = SqliteVectorStore::open(&path).await.unwrap();
    let entry = reopened.get("memory_1").await.unwrap();
    assert_eq!(entry.vector, vec![1.0, 2.0]);
    assert_eq!(entry.metadata, b"durable");
    assert_eq!(reopened.len().await.unwrap(), 1);
}
