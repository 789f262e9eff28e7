// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo integration tests.
//!
//! Provides deterministic collaborators and a harness for fast, CI-runnable
//! tests without an embedding server or language model.
//!
//! # Components
//!
//! - [`AxisEmbedder`] - topic-axis embeddings with call counting and failure injection
//! - [`MockSummarizer`] - queued summaries and heuristic keywords
//! - [`TestHarness`] - a vector store (in-memory or temp-dir SQLite) plus both mocks
//! - [`fixtures`] - canned points and conversation logs

pub mod fixtures;
pub mod harness;
pub mod mock_embedder;
pub mod mock_summarizer;

pub use harness::{StoreKind, TestHarness};
pub use mock_embedder::AxisEmbedder;
pub use mock_summarizer::MockSummarizer;
