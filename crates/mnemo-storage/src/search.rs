// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranking and entry validation shared by both backends.

use mnemo_core::MnemoError;
use mnemo_core::types::VectorEntry;
use mnemo_core::vector::cosine_similarity;

/// Reject entries no backend can store meaningfully.
pub fn validate_entry(key: &str, vector: &[f64]) -> Result<(), MnemoError> {
    if key.is_empty() {
        return Err(MnemoError::InvalidInput("vector key must not be empty".into()));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(MnemoError::InvalidInput(format!(
            "vector for `{key}` contains a non-finite component"
        )));
    }
    Ok(())
}

/// Pick the best `top_n` candidates for `query`.
///
/// Only candidates with a non-empty vector are considered. With an empty
/// query every candidate scores `0.0`, which yields an arbitrary selection.
/// Candidates scoring below `min_score` are dropped before truncation, and
/// ties keep their input order.
pub fn rank<'a, I>(
    candidates: I,
    query: &[f64],
    top_n: usize,
    min_score: Option<f64>,
) -> Vec<&'a VectorEntry>
where
    I: IntoIterator<Item = &'a VectorEntry>,
{
    if top_n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &VectorEntry)> = candidates
        .into_iter()
        .filter(|entry| !entry.vector.is_empty())
        .map(|entry| {
            let score = if query.is_empty() {
                0.0
            } else {
                cosine_similarity(query, &entry.vector)
            };
            (score, entry)
        })
        .filter(|(score, _)| min_score.is_none_or(|min| *score >= min))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_n);
    scored.into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, vector: Vec<f64>) -> VectorEntry {
        VectorEntry::new(key, vector, Vec::new())
    }

    #[test]
    fn ranks_by_descending_similarity() {
        let entries = vec![
            entry("far", vec![0.0, 1.0]),
            entry("near", vec![1.0, 0.1]),
            entry("exact", vec![1.0, 0.0]),
        ];
        let ranked = rank(&entries, &[1.0, 0.0], 10, None);
        let keys: Vec<&str> = ranked.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["exact", "near", "far"]);
    }

    #[test]
    fn truncates_to_top_n() {
        let entries: Vec<VectorEntry> = (0..5)
            .map(|i| entry(&format!("k{i}"), vec![1.0, i as f64]))
            .collect();
        assert_eq!(rank(&entries, &[1.0, 0.0], 2, None).len(), 2);
        assert!(rank(&entries, &[1.0, 0.0], 0, None).is_empty());
    }

    #[test]
    fn threshold_applies_before_truncation() {
        let entries = vec![entry("a", vec![1.0, 0.0]), entry("b", vec![0.0, 1.0])];
        let ranked = rank(&entries, &[1.0, 0.0], 10, Some(0.9));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "a");
    }

    #[test]
    fn empty_query_returns_embedded_candidates() {
        let entries = vec![
            entry("a", vec![1.0]),
            entry("unembedded", vec![]),
            entry("b", vec![2.0]),
        ];
        let ranked = rank(&entries, &[], 10, None);
        let keys: Vec<&str> = ranked.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        let entries = vec![entry("short", vec![1.0]), entry("ok", vec![1.0, 0.0])];
        let ranked = rank(&entries, &[1.0, 0.0], 10, Some(0.5));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].key, "ok");
    }

    #[test]
    fn validate_rejects_bad_entries() {
        assert!(validate_entry("", &[1.0]).is_err());
        assert!(validate_entry("k", &[f64::NAN]).is_err());
        assert!(validate_entry("k", &[f64::INFINITY]).is_err());
        assert!(validate_entry("k", &[]).is_ok());
        assert!(validate_entry("k", &[0.5, -0.5]).is_ok());
    }
}
