// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Pluggable collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod memory;
pub mod summarizer;
pub mod vector_store;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingProvider;
pub use memory::Memory;
pub use summarizer::Summarizer;
pub use vector_store::VectorStore;
