// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo memory engine.
//!
//! This crate provides the trait definitions, error type, data model, and
//! vector math used throughout the Mnemo workspace. Store backends,
//! embedding providers, and summarizers implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemoError;
pub use types::{
    AdapterType, ConsolidationReport, ConversationLog, HealthStatus, LogMessage, MemoryPoint,
    Scene, VectorEntry,
};

pub use traits::{EmbeddingProvider, Memory, PluginAdapter, Summarizer, VectorStore};
