// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store backends for the Mnemo memory engine.
//!
//! Both backends implement [`mnemo_core::VectorStore`] with identical
//! semantics: keyed upserts, linear-scan cosine search, prefix scans, and a
//! payload the store never interprets.
//!
//! - [`InMemoryVectorStore`]: a map behind a read-write lock, lost on exit.
//! - [`SqliteVectorStore`]: a WAL-mode SQLite file with embedded migrations,
//!   serialized through `tokio-rusqlite`'s single background thread.

pub mod memory;
pub mod migrations;
pub mod search;
pub mod sqlite;

pub use memory::InMemoryVectorStore;
pub use sqlite::SqliteVectorStore;
