// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Term-frequency embedder with no external dependencies.
//!
//! Untrained, it embeds text as a normalized 256-bucket character frequency
//! vector. After [`LocalEmbedder::train`] it embeds text as a normalized term
//! frequency vector over the learned vocabulary.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use mnemo_core::vector::normalize;
use mnemo_core::{AdapterType, EmbeddingProvider, HealthStatus, MnemoError, PluginAdapter};

/// Dimensionality of the untrained character-frequency embedding.
pub const CHAR_FREQUENCY_DIM: usize = 256;

const SEPARATORS: &[char] = &[' ', '\t', '\n', ',', '.', '!', '?'];

#[derive(Debug, Default)]
struct Vocabulary {
    index: HashMap<String, usize>,
    documents: usize,
}

/// Local term-frequency embedder.
#[derive(Debug, Default)]
pub struct LocalEmbedder {
    vocabulary: RwLock<Option<Vocabulary>>,
}

impl LocalEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the vocabulary with the terms of `documents`, indexed in
    /// first-seen order. An empty corpus leaves the embedder unchanged.
    pub fn train<S: AsRef<str>>(&self, documents: &[S]) {
        if documents.is_empty() {
            return;
        }
        let mut index = HashMap::new();
        for doc in documents {
            for term in tokenize(doc.as_ref()) {
                let next = index.len();
                index.entry(term).or_insert(next);
            }
        }
        let vocabulary = Vocabulary {
            index,
            documents: documents.len(),
        };
        *self
            .vocabulary
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(vocabulary);
    }

    /// Vocabulary size, or `None` before training.
    pub fn vocabulary_len(&self) -> Option<usize> {
        self.vocabulary
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|v| v.index.len())
    }

    /// Embed synchronously.
    pub fn embed(&self, text: &str) -> Vec<f64> {
        let guard = self
            .vocabulary
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut vector = match guard.as_ref() {
            Some(vocabulary) => term_frequency(text, vocabulary),
            None => char_frequency(text),
        };
        normalize(&mut vector);
        vector
    }
}

/// Split on whitespace and `, . ! ?`, lowercasing every term.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(SEPARATORS)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn term_frequency(text: &str, vocabulary: &Vocabulary) -> Vec<f64> {
    let mut vector = vec![0.0; vocabulary.index.len()];
    for term in tokenize(text) {
        if let Some(&idx) = vocabulary.index.get(&term) {
            vector[idx] += 1.0;
        }
    }
    vector
}

fn char_frequency(text: &str) -> Vec<f64> {
    let mut vector = vec![0.0; CHAR_FREQUENCY_DIM];
    for c in text.chars() {
        let code = c as usize;
        if code < CHAR_FREQUENCY_DIM {
            vector[code] += 1.0;
        }
    }
    vector
}

#[async_trait]
impl PluginAdapter for LocalEmbedder {
    fn name(&self) -> &str {
        "local-tf"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        let documents = self
            .vocabulary
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|v| v.documents);
        Ok(match documents {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("untrained, using character frequencies".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, MnemoError> {
        Ok(self.embed(text))
    }
}
