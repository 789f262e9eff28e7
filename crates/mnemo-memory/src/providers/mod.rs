// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in embedding and summarization providers, plus config-driven
//! construction helpers.

pub mod chat;
pub mod local;
pub mod ollama;

use std::sync::Arc;

use mnemo_config::model::{EmbeddingConfig, EmbeddingProviderKind, LlmConfig};
use mnemo_core::{EmbeddingProvider, MnemoError, Summarizer};

pub use chat::ChatSummarizer;
pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;

/// Build the configured embedding provider. `None` when embeddings are disabled.
pub fn embedding_provider_from_config(
    config: &EmbeddingConfig,
) -> Result<Option<Arc<dyn EmbeddingProvider>>, MnemoError> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::None => return Ok(None),
        EmbeddingProviderKind::Local => Arc::new(LocalEmbedder::new()),
        EmbeddingProviderKind::Ollama => Arc::new(OllamaEmbedder::from_config(config)?),
    };
    Ok(Some(provider))
}

/// Build the configured summarizer. `None` when the language model is disabled.
pub fn summarizer_from_config(
    config: &LlmConfig,
) -> Result<Option<Arc<dyn Summarizer>>, MnemoError> {
    if !config.enabled {
        return Ok(None);
    }
    Ok(Some(Arc::new(ChatSummarizer::from_config(config)?)))
}
