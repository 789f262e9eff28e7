// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a vector store and mock collaborators.
//!
//! The harness owns the temporary directory of an on-disk store, so the
//! database lives exactly as long as the harness.

use std::sync::Arc;

use mnemo_core::{MnemoError, VectorStore};
use mnemo_storage::{InMemoryVectorStore, SqliteVectorStore};

use crate::mock_embedder::AxisEmbedder;
use crate::mock_summarizer::MockSummarizer;

/// Which backend the harness opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    InMemory,
    SqliteFile,
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    kind: StoreKind,
    embedder: Option<AxisEmbedder>,
    summarizer: Option<MockSummarizer>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            kind: StoreKind::InMemory,
            embedder: None,
            summarizer: None,
        }
    }

    pub fn with_store(mut self, kind: StoreKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replace the default [`AxisEmbedder`].
    pub fn with_embedder(mut self, embedder: AxisEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Replace the default [`MockSummarizer`].
    pub fn with_summarizer(mut self, summarizer: MockSummarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub async fn build(self) -> Result<TestHarness, MnemoError> {
        let (store, temp_dir): (Arc<dyn VectorStore>, Option<tempfile::TempDir>) = match self.kind
        {
            StoreKind::InMemory => (Arc::new(InMemoryVectorStore::new()), None),
            StoreKind::SqliteFile => {
                let dir = tempfile::TempDir::new()
                    .map_err(|e| MnemoError::Storage { source: e.into() })?;
                let store = SqliteVectorStore::open(dir.path().join("memory.db")).await?;
                (Arc::new(store), Some(dir))
            }
        };

        Ok(TestHarness {
            store,
            embedder: Arc::new(self.embedder.unwrap_or_default()),
            summarizer: Arc::new(self.summarizer.unwrap_or_default()),
            _temp_dir: temp_dir,
        })
    }
}

/// A store plus deterministic collaborators for integration tests.
pub struct TestHarness {
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<AxisEmbedder>,
    pub summarizer: Arc<MockSummarizer>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// In-memory store with default collaborators.
    pub async fn in_memory() -> Result<Self, MnemoError> {
        Self::builder().build().await
    }

    /// On-disk SQLite store in a fresh temporary directory.
    pub async fn sqlite() -> Result<Self, MnemoError> {
        Self::builder().with_store(StoreKind::SqliteFile).build().await
    }

    /// Path of the temporary directory, for on-disk harnesses.
    pub fn temp_path(&self) -> Option<&std::path::Path> {
        self._temp_dir.as_ref().map(|d| d.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_both_backends() {
        let memory = TestHarness::in_memory().await.unwrap();
        assert!(memory.temp_path().is_none());
        memory.store.put("k", vec![1.0], vec![]).await.unwrap();
        assert_eq!(memory.store.get("k").await.unwrap().vector, vec![1.0]);

        let disk = TestHarness::sqlite().await.unwrap();
        assert!(disk.temp_path().unwrap().join("memory.db").exists());
        disk.store.put("k", vec![2.0], vec![]).await.unwrap();
        assert_eq!(disk.store.get("k").await.unwrap().vector, vec![2.0]);
    }
}
