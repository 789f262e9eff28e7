// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::traits::adapter::PluginAdapter;

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: PluginAdapter {
    /// Embed a single text.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, MnemoError>;

    /// Embed several texts in order. The first failure aborts the call.
    async fn generate_batch_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f64>>, MnemoError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.generate_embedding(text).await?);
        }
        Ok(out)
    }
}
