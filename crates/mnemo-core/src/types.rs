// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, embedding, and memory layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Cluster id carried by points that have not gone through consolidation.
pub const UNCLUSTERED: i64 = -1;

/// Lower bound for a point's total weight after any adjustment.
pub const MIN_TOTAL_WEIGHT: f64 = 0.1;

/// Upper bound for a point's total weight after any adjustment.
pub const MAX_TOTAL_WEIGHT: f64 = 3.0;

/// Clamp a total weight into `[MIN_TOTAL_WEIGHT, MAX_TOTAL_WEIGHT]`.
///
/// NaN collapses to the lower bound.
pub fn clamp_total_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return MIN_TOTAL_WEIGHT;
    }
    weight.clamp(MIN_TOTAL_WEIGHT, MAX_TOTAL_WEIGHT)
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    VectorStore,
    Embedding,
    Summarizer,
}

/// Context tag that selects the coefficients used to blend weights.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    /// Casual conversation; recency dominates.
    Chat,
    /// Durable knowledge; repetition and emphasis dominate.
    Knowledge,
    /// Anything else.
    #[default]
    General,
}

impl Scene {
    /// Parse a scene label, treating anything unrecognized as [`Scene::General`].
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

/// One durable unit of long-term memory.
///
/// `vector` is not part of the serialized payload; the store keeps it
/// alongside the record and the codec restores it on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPoint {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    #[serde(skip)]
    pub vector: Vec<f64>,
    #[serde(default = "unclustered")]
    pub cluster_id: i64,
    #[serde(default)]
    pub time_weight: f64,
    #[serde(default)]
    pub repeat_weight: f64,
    #[serde(default)]
    pub emphasis_weight: f64,
    #[serde(default)]
    pub total_weight: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn unclustered() -> i64 {
    UNCLUSTERED
}

impl Default for MemoryPoint {
    fn default() -> Self {
        Self {
            id: 0,
            keywords: Vec::new(),
            content: String::new(),
            summary: String::new(),
            vector: Vec::new(),
            cluster_id: UNCLUSTERED,
            time_weight: 0.0,
            repeat_weight: 0.0,
            emphasis_weight: 0.0,
            total_weight: 0.0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl MemoryPoint {
    /// Build an unweighted, unembedded point from its text fields.
    pub fn new(
        keywords: impl IntoIterator<Item = impl Into<String>>,
        content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            content: content.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// A point with empty content or no keywords is a cleanup target.
    pub fn is_invalid(&self) -> bool {
        self.content.trim().is_empty() || self.keywords.iter().all(|k| k.trim().is_empty())
    }

    /// Text used to embed this point: keywords, summary, then content.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
        parts.push(&self.summary);
        parts.push(&self.content);
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The storage-layer record: a key, its vector, and an opaque payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorEntry {
    pub key: String,
    pub vector: Vec<f64>,
    pub metadata: Vec<u8>,
}

impl VectorEntry {
    pub fn new(key: impl Into<String>, vector: Vec<f64>, metadata: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            vector,
            metadata,
        }
    }
}

/// A single message inside a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A finished conversation handed over by the session layer for consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationLog {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<LogMessage>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Outcome of one consolidation batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    /// Number of logs handed in.
    pub logs: usize,
    /// Number of clusters produced (0 when clustering was skipped).
    pub clusters: usize,
    /// Points successfully written.
    pub stored: usize,
    /// Points that failed to persist.
    pub failed: usize,
}
