// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo memory engine.

use thiserror::Error;

/// The primary error type used across all Mnemo adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested key or memory point does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Caller supplied input that can never succeed (empty text, malformed vector).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding or summarization capability failed or is not configured.
    #[error("upstream unavailable: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (I/O failure, closed store, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Shorthand for a "not found" error on a storage key.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        MnemoError::NotFound {
            kind: "key",
            key: key.into(),
        }
    }

    /// Shorthand for an upstream error without an underlying cause.
    pub fn upstream(message: impl Into<String>) -> Self {
        MnemoError::Upstream {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error means the requested item is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MnemoError::NotFound { .. })
    }

    /// Whether this error came from an embedding or summarization collaborator.
    pub fn is_upstream(&self) -> bool {
        matches!(self, MnemoError::Upstream { .. } | MnemoError::Timeout { .. })
    }
}
