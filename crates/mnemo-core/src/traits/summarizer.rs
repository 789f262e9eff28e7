// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarization and keyword extraction capability.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::traits::adapter::PluginAdapter;

/// Language-model backed text condensation.
///
/// Callers must treat every failure as a reason to fall back to a
/// non-model heuristic, never as fatal.
#[async_trait]
pub trait Summarizer: PluginAdapter {
    /// Produce a short restatement of `text`.
    async fn summarize(&self, text: &str) -> Result<String, MnemoError>;

    /// Produce a small set of keywords describing `text`.
    async fn extract_keywords(&self, text: &str) -> Result<Vec<String>, MnemoError>;
}
