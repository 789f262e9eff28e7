// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge rules for a new point that lands on an existing near-duplicate.

use chrono::{DateTime, Utc};
use mnemo_core::types::clamp_total_weight;
use mnemo_core::MemoryPoint;

use crate::text::normalize_keywords;

/// Repeat weight added to the surviving point on every merge.
pub const MERGE_REPEAT_BONUS: f64 = 0.1;

/// Fold `incoming` into `existing`.
///
/// The existing point keeps its identity (id, cluster, creation time). The
/// longer content and summary win, keywords are unioned, total weight takes
/// the larger value, repeat weight grows by [`MERGE_REPEAT_BONUS`], and the
/// incoming vector replaces the old one when present.
pub fn merge_points(existing: &MemoryPoint, incoming: &MemoryPoint, now: DateTime<Utc>) -> MemoryPoint {
    let mut merged = existing.clone();

    if incoming.content.chars().count() > existing.content.chars().count() {
        merged.content = incoming.content.clone();
    }
    if incoming.summary.chars().count() > existing.summary.chars().count() {
        merged.summary = incoming.summary.clone();
    }

    merged.keywords = normalize_keywords(existing.keywords.iter().chain(incoming.keywords.iter()));
    merged.total_weight = clamp_total_weight(existing.total_weight.max(incoming.total_weight));
    merged.repeat_weight = existing.repeat_weight + MERGE_REPEAT_BONUS;
    if !incoming.vector.is_empty() {
        merged.vector = incoming.vector.clone();
    }
    if merged.created_at.is_none() {
        merged.created_at = incoming.created_at;
    }
    merged.updated_at = Some(now);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn point(keywords: &[&str], content: &str, summary: &str, total: f64) -> MemoryPoint {
        let mut p = MemoryPoint::new(keywords.iter().copied(), content, summary);
        p.total_weight = total;
        p.repeat_weight = 1.0;
        p
    }

    #[test]
    fn longer_text_wins() {
        let existing = point(&["go"], "short", "a much longer summary", 1.0);
        let incoming = point(&["go"], "a much longer content", "short", 1.0);
        let merged = merge_points(&existing, &incoming, Utc::now());
        assert_eq!(merged.content, "a much longer content");
        assert_eq!(merged.summary, "a much longer summary");
    }

    #[test]
    fn keywords_are_unioned_and_trimmed() {
        let existing = point(&["go", " rust "], "c", "s", 1.0);
        let incoming = point(&["rust", "tokio", ""], "c", "s", 1.0);
        let merged = merge_points(&existing, &incoming, Utc::now());
        assert_eq!(merged.keywords, vec!["go", "rust", "tokio"]);
    }

    #[test]
    fn weights_follow_merge_rules() {
        let existing = point(&["go"], "c", "s", 0.8);
        let incoming = point(&["go"], "c", "s", 1.4);
        let merged = merge_points(&existing, &incoming, Utc::now());
        assert_eq!(merged.total_weight, 1.4);
        assert!((merged.repeat_weight - 1.1).abs() < 1e-12);

        let heavy = point(&["go"], "c", "s", 9.0);
        assert_eq!(merge_points(&existing, &heavy, Utc::now()).total_weight, 3.0);
    }

    #[test]
    fn identity_is_preserved_and_vector_replaced() {
        let created = Utc::now() - Duration::days(5);
        let mut existing = point(&["go"], "c", "s", 1.0);
        existing.id = 42;
        existing.cluster_id = 3;
        existing.created_at = Some(created);
        existing.vector = vec![1.0, 0.0];

        let mut incoming = point(&["go"], "c", "s", 1.0);
        incoming.vector = vec![0.0, 1.0];
        incoming.created_at = Some(Utc::now());

        let now = Utc::now();
        let merged = merge_points(&existing, &incoming, now);
        assert_eq!(merged.id, 42);
        assert_eq!(merged.cluster_id, 3);
        assert_eq!(merged.created_at, Some(created));
        assert_eq!(merged.updated_at, Some(now));
        assert_eq!(merged.vector, vec![0.0, 1.0]);
    }

    #[test]
    fn empty_incoming_vector_keeps_existing() {
        let mut existing = point(&["go"], "c", "s", 1.0);
        existing.vector = vec![1.0];
        let incoming = point(&["go"], "c", "s", 1.0);
        assert_eq!(merge_points(&existing, &incoming, Utc::now()).vector, vec![1.0]);
    }
}
