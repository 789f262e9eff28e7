// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a no-op.

use metrics::{counter, describe_counter};

/// Register all memory engine metric descriptions.
pub fn register_metrics() {
    describe_counter!("mnemo_memory_records_total", "Memory points written");
    describe_counter!(
        "mnemo_memory_dedup_merges_total",
        "Writes merged into an existing near-duplicate"
    );
    describe_counter!(
        "mnemo_memory_cleanup_deleted_total",
        "Points removed by cleanup"
    );
    describe_counter!("mnemo_memory_searches_total", "Memory searches served");
    describe_counter!(
        "mnemo_embedding_cache_hits_total",
        "Embedding requests answered from cache"
    );
    describe_counter!(
        "mnemo_embedding_cache_misses_total",
        "Embedding requests forwarded to the provider"
    );
    describe_counter!(
        "mnemo_consolidation_clusters_total",
        "Clusters produced by consolidation"
    );
}

pub fn record_write(merged: bool) {
    counter!("mnemo_memory_records_total").increment(1);
    if merged {
        counter!("mnemo_memory_dedup_merges_total").increment(1);
    }
}

pub fn record_cleanup(deleted: usize) {
    counter!("mnemo_memory_cleanup_deleted_total").increment(deleted as u64);
}

/// `mode` is `"vector"` or `"keyword"` (degraded path).
pub fn record_search(mode: &'static str) {
    counter!("mnemo_memory_searches_total", "mode" => mode).increment(1);
}

pub fn record_cache(hit: bool) {
    if hit {
        counter!("mnemo_embedding_cache_hits_total").increment(1);
    } else {
        counter!("mnemo_embedding_cache_misses_total").increment(1);
    }
}

pub fn record_clusters(count: usize) {
    counter!("mnemo_consolidation_clusters_total").increment(count as u64);
}
