// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory facade consumed by the reasoning pipeline.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::{ConsolidationReport, ConversationLog, MemoryPoint};

/// Long-term memory: record facts, recall them, keep the store tidy.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Persist a point, merging into a near-duplicate when one exists.
    async fn record(&self, point: MemoryPoint) -> Result<(), MnemoError>;

    /// Return up to a handful of points relevant to `terms`, heaviest first.
    ///
    /// Embedding failures degrade to keyword-only matching; only storage
    /// failures are returned as errors.
    async fn search(&self, terms: &str) -> Result<Vec<MemoryPoint>, MnemoError>;

    /// Remove stale and invalid points.
    async fn optimize(&self) -> Result<(), MnemoError>;

    /// Collapse a batch of conversation logs into clustered memory points.
    async fn cluster_conversations(
        &self,
        logs: &[ConversationLog],
    ) -> Result<ConsolidationReport, MnemoError>;
}
