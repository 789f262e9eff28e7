// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory engine.
//!
//! Turns facts and conversation logs into weighted, embedded memory points
//! and serves the relevant ones back for a query. The pieces:
//!
//! - [`embedding::EmbeddingService`]: LRU-cached wrapper around a provider.
//! - [`weights`]: time, repetition, and emphasis scoring.
//! - [`dedup`]: merge rules for near-duplicate points.
//! - [`cluster`]: k-means grouping and cluster collapse.
//! - [`engine::MemoryEngine`]: the [`mnemo_core::Memory`] implementation.

pub mod cluster;
pub mod codec;
pub mod dedup;
pub mod embedding;
pub mod engine;
pub mod metrics;
pub mod providers;
pub mod text;
pub mod weights;

mod consolidation;

pub use embedding::EmbeddingService;
pub use engine::MemoryEngine;
