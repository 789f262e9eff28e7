// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemo memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Vector store backend settings.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Embedding provider and cache settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Optional language model used for summaries and keywords.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Retrieval, deduplication, and cleanup tuning.
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which vector store implementation to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    /// Durable SQLite file.
    #[default]
    Sqlite,
    /// Volatile in-process map.
    Memory,
}

/// Vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VectorStoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: VectorStoreBackend,

    /// Path to the SQLite database file (sqlite backend only).
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::default(),
            data_path: default_data_path(),
        }
    }
}

fn default_data_path() -> String {
    "data/memory/mnemo.db".to_string()
}

/// Which embedding provider to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Ollama `/api/embeddings` endpoint.
    #[default]
    Ollama,
    /// In-process term-frequency embedder, no network.
    Local,
    /// No embeddings; retrieval runs keyword-only.
    None,
}

/// Embedding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Base URL of the embedding server.
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Number of texts kept in the LRU embedding cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            cache_capacity: default_cache_capacity(),
            timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_cache_capacity() -> usize {
    500
}

fn default_embedding_timeout_secs() -> u64 {
    30
}

/// Language model configuration for summaries and keyword extraction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// When false, summaries and keywords use the built-in heuristics.
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI-compatible API base (the path `/chat/completions` is appended).
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Bearer token. Empty means no Authorization header.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub summary_model: String,

    #[serde(default = "default_llm_model")]
    pub keyword_model: String,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_llm_base_url(),
            api_key: String::new(),
            summary_model: default_llm_model(),
            keyword_model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

/// Memory engine tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, the binary refuses memory commands.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Minimum cosine similarity between query and point for retrieval.
    #[serde(default = "default_search_similarity_threshold")]
    pub search_similarity_threshold: f64,

    /// Minimum keyword overlap ratio for retrieval.
    #[serde(default = "default_keyword_match_threshold")]
    pub keyword_match_threshold: f64,

    /// Number of points returned by a search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Similarity above which a new point merges into an existing one.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// Maximum number of points inspected by repeat-weight scoring.
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,

    /// Points below this total weight are eligible for age-based cleanup.
    #[serde(default = "default_cleanup_min_weight")]
    pub cleanup_min_weight: f64,

    /// Age in days after which low-weight points are removed.
    #[serde(default = "default_cleanup_max_age_days")]
    pub cleanup_max_age_days: i64,

    /// Number of assign + recenter passes in k-means.
    #[serde(default = "default_kmeans_passes")]
    pub kmeans_passes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            search_similarity_threshold: default_search_similarity_threshold(),
            keyword_match_threshold: default_keyword_match_threshold(),
            search_limit: default_search_limit(),
            dedup_threshold: default_dedup_threshold(),
            scan_limit: default_scan_limit(),
            cleanup_min_weight: default_cleanup_min_weight(),
            cleanup_max_age_days: default_cleanup_max_age_days(),
            kmeans_passes: default_kmeans_passes(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_search_similarity_threshold() -> f64 {
    0.5
}

fn default_keyword_match_threshold() -> f64 {
    0.6
}

fn default_search_limit() -> usize {
    3
}

fn default_dedup_threshold() -> f64 {
    0.85
}

fn default_scan_limit() -> usize {
    1000
}

fn default_cleanup_min_weight() -> f64 {
    0.1
}

fn default_cleanup_max_age_days() -> i64 {
    30
}

fn default_kmeans_passes() -> usize {
    1
}
