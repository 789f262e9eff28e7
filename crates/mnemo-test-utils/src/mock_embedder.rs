// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding provider for tests.
//!
//! `AxisEmbedder` maps each known word to a topic axis and every unknown
//! word to a shared "other" axis with a small weight. Texts about the same
//! topic therefore embed close together and texts about different topics
//! embed nearly orthogonally, without any model.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use mnemo_core::vector::normalize;
use mnemo_core::{AdapterType, EmbeddingProvider, HealthStatus, MnemoError, PluginAdapter};

/// Weight of a word that belongs to no topic.
const UNKNOWN_WORD_WEIGHT: f64 = 0.25;

/// Topic axes available out of the box.
const DEFAULT_TOPICS: &[(&str, &[&str])] = &[
    (
        "programming",
        &[
            "go", "golang", "programming", "developer", "code", "rust", "software", "compiler",
        ],
    ),
    (
        "weather",
        &[
            "weather", "rain", "raining", "sunny", "sun", "forecast", "umbrella", "cold", "hot",
            "temperature", "snow",
        ],
    ),
    (
        "food",
        &[
            "food", "pizza", "dinner", "lunch", "restaurant", "cook", "eat", "noodles", "recipe",
            "pasta", "hungry",
        ],
    ),
];

/// Vocabulary-to-axis embedder with call counting and failure injection.
#[derive(Debug)]
pub struct AxisEmbedder {
    axes: Vec<String>,
    vocabulary: HashMap<String, usize>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl AxisEmbedder {
    /// Embedder with the programming, weather, and food topics.
    pub fn new() -> Self {
        let mut embedder = Self::empty();
        for (topic, words) in DEFAULT_TOPICS {
            embedder = embedder.with_axis(topic, words);
        }
        embedder
    }

    /// Embedder with no topics; every word lands on the "other" axis.
    pub fn empty() -> Self {
        Self {
            axes: Vec::new(),
            vocabulary: HashMap::new(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Add a topic axis. Words already mapped move to the new axis.
    pub fn with_axis(mut self, topic: &str, words: &[&str]) -> Self {
        let axis = self.axes.len();
        self.axes.push(topic.to_string());
        for word in words {
            self.vocabulary.insert(word.to_lowercase(), axis);
        }
        self
    }

    /// Vector length: one per topic plus the "other" axis.
    pub fn dimensions(&self) -> usize {
        self.axes.len() + 1
    }

    /// Number of `generate_embedding` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with an upstream error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Embed synchronously, bypassing counters and failure injection.
    pub fn embed(&self, text: &str) -> Vec<f64> {
        let other = self.axes.len();
        let mut vector = vec![0.0; self.dimensions()];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            match self.vocabulary.get(&word.to_lowercase()) {
                Some(&axis) => vector[axis] += 1.0,
                None => vector[other] += UNKNOWN_WORD_WEIGHT,
            }
        }
        normalize(&mut vector);
        vector
    }
}

impl Default for AxisEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for AxisEmbedder {
    fn name(&self) -> &str {
        "axis-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("failure injected".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for AxisEmbedder {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemoError::upstream("axis embedder failure injected"));
        }
        Ok(self.embed(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::vector::cosine_similarity;

    #[test]
    fn same_topic_embeds_close() {
        let e = AxisEmbedder::new();
        let a = e.embed("go programming likes Go user is a Go developer");
        let b = e.embed("programming");
        assert!(cosine_similarity(&a, &b) > 0.9);
    }

    #[test]
    fn different_topics_embed_apart() {
        let e = AxisEmbedder::new();
        let weather = e.embed("will it rain tomorrow, what is the forecast");
        let food = e.embed("let us cook pasta for dinner");
        assert!(cosine_similarity(&weather, &food) < 0.5);
    }

    #[test]
    fn unknown_words_share_one_axis() {
        let e = AxisEmbedder::empty();
        assert_eq!(e.dimensions(), 1);
        assert_eq!(e.embed("alpha beta"), vec![1.0]);
    }

    #[tokio::test]
    async fn counts_calls_and_injects_failures() {
        let e = AxisEmbedder::new();
        e.generate_embedding("rain").await.unwrap();
        e.set_failing(true);
        assert!(e.generate_embedding("rain").await.unwrap_err().is_upstream());
        assert_eq!(e.calls(), 2);
    }
}
