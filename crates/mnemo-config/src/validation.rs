// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates constraints that serde attributes cannot express, such as
//! threshold ranges and non-empty endpoints for enabled providers.

use crate::diagnostic::ConfigError;
use crate::model::{EmbeddingProviderKind, MnemoConfig, VectorStoreBackend};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.vector_store.backend == VectorStoreBackend::Sqlite
        && config.vector_store.data_path.trim().is_empty()
    {
        fail("vector_store.data_path must not be empty for the sqlite backend".to_string());
    }

    let embedding = &config.embedding;
    if embedding.cache_capacity == 0 {
        fail("embedding.cache_capacity must be at least 1".to_string());
    }
    if embedding.provider == EmbeddingProviderKind::Ollama {
        if embedding.base_url.trim().is_empty() {
            fail("embedding.base_url must not be empty for the ollama provider".to_string());
        }
        if embedding.model.trim().is_empty() {
            fail("embedding.model must not be empty for the ollama provider".to_string());
        }
        if embedding.timeout_secs == 0 {
            fail("embedding.timeout_secs must be at least 1".to_string());
        }
    }

    let llm = &config.llm;
    if llm.enabled {
        if llm.base_url.trim().is_empty() {
            fail("llm.base_url must not be empty when llm.enabled = true".to_string());
        }
        if llm.summary_model.trim().is_empty() || llm.keyword_model.trim().is_empty() {
            fail("llm.summary_model and llm.keyword_model must not be empty".to_string());
        }
        if llm.timeout_secs == 0 {
            fail("llm.timeout_secs must be at least 1".to_string());
        }
    }

    let memory = &config.memory;
    for (name, value) in [
        ("search_similarity_threshold", memory.search_similarity_threshold),
        ("keyword_match_threshold", memory.keyword_match_threshold),
        ("dedup_threshold", memory.dedup_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            fail(format!("memory.{name} must be within [0, 1], got {value}"));
        }
    }
    if memory.search_limit == 0 {
        fail("memory.search_limit must be at least 1".to_string());
    }
    if memory.scan_limit == 0 {
        fail("memory.scan_limit must be at least 1".to_string());
    }
    if memory.kmeans_passes == 0 {
        fail("memory.kmeans_passes must be at least 1".to_string());
    }
    if memory.cleanup_min_weight < 0.0 {
        fail(format!(
            "memory.cleanup_min_weight must be non-negative, got {}",
            memory.cleanup_min_weight
        ));
    }
    if memory.cleanup_max_age_days < 0 {
        fail(format!(
            "memory.cleanup_max_age_days must be non-negative, got {}",
            memory.cleanup_max_age_days
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&MnemoConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = MnemoConfig::default();
        config.memory.dedup_threshold = 1.5;
        config.memory.search_limit = 0;
        config.embedding.cache_capacity = 0;
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn disabled_llm_is_not_checked() {
        let mut config = MnemoConfig::default();
        config.llm.base_url = String::new();
        assert!(validate_config(&config).is_ok());

        config.llm.enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn memory_backend_ignores_data_path() {
        let mut config = MnemoConfig::default();
        config.vector_store.data_path = " ".into();
        assert!(validate_config(&config).is_err());

        config.vector_store.backend = VectorStoreBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }
}
