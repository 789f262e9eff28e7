// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! K-means grouping of embedded points and collapse of a cluster into one point.
//!
//! Seeding is deterministic (farthest-first from the first point), so the
//! same input always yields the same clusters. By default a single
//! assign + recenter pass runs; more passes stop early once assignments
//! settle.

use mnemo_core::types::UNCLUSTERED;
use mnemo_core::vector::{mean_vector, squared_distance};
use mnemo_core::{MemoryPoint, MnemoError};

use crate::text::{clip, CLUSTER_CONTENT_CHAR_LIMIT};

/// Keywords kept on a combined point.
pub const MAX_CLUSTER_KEYWORDS: usize = 10;

/// Number of clusters for `n` embedded points.
///
/// `floor(sqrt(n / 2))` clamped to `[2, 10]`, overridden to 2, 3, and 4
/// below 10, 20, and 50 points respectively.
pub fn determine_k(n: usize) -> usize {
    if n < 10 {
        return 2;
    }
    if n < 20 {
        return 3;
    }
    if n < 50 {
        return 4;
    }
    ((n as f64 / 2.0).sqrt() as usize).clamp(2, 10)
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index for each input point, in input order.
    pub assignments: Vec<usize>,
    /// Final centroid of each cluster.
    pub centroids: Vec<Vec<f64>>,
}

impl Clustering {
    /// Member indices of every non-empty cluster, paired with its cluster index.
    pub fn groups(&self) -> Vec<(usize, Vec<usize>)> {
        let mut groups: Vec<(usize, Vec<usize>)> =
            (0..self.centroids.len()).map(|c| (c, Vec::new())).collect();
        for (idx, &cluster) in self.assignments.iter().enumerate() {
            groups[cluster].1.push(idx);
        }
        groups.retain(|(_, members)| !members.is_empty());
        groups
    }
}

/// Run k-means over `points` with `k` clusters and up to `passes` iterations.
///
/// Fails when `k` is zero, when there are fewer points than clusters, or when
/// the points do not share one non-zero dimensionality.
pub fn kmeans(points: &[&[f64]], k: usize, passes: usize) -> Result<Clustering, MnemoError> {
    if k == 0 {
        return Err(MnemoError::InvalidInput("k must be at least 1".into()));
    }
    if points.len() < k {
        return Err(MnemoError::InvalidInput(format!(
            "cannot form {k} clusters from {} points",
            points.len()
        )));
    }
    let dim = points[0].len();
    if dim == 0 || points.iter().any(|p| p.len() != dim) {
        return Err(MnemoError::InvalidInput(
            "points must share one non-zero dimensionality".into(),
        ));
    }

    let mut centroids = seed(points, k);
    let mut assignments = vec![usize::MAX; points.len()];

    for _ in 0..passes.max(1) {
        let next: Vec<usize> = points.iter().map(|p| nearest(&centroids, p)).collect();
        let settled = next == assignments;
        assignments = next;
        if settled {
            break;
        }
        recenter(points, &assignments, &mut centroids);
    }

    Ok(Clustering {
        assignments,
        centroids,
    })
}

/// Farthest-first seeding starting from the first point.
fn seed(points: &[&[f64]], k: usize) -> Vec<Vec<f64>> {
    let mut centroids: Vec<Vec<f64>> = vec![points[0].to_vec()];
    let mut closest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, points[0]))
        .collect();

    while centroids.len() < k {
        let mut pick = 0;
        let mut best = f64::NEG_INFINITY;
        for (idx, &d) in closest.iter().enumerate() {
            if d > best {
                best = d;
                pick = idx;
            }
        }
        let center = points[pick];
        for (d, p) in closest.iter_mut().zip(points.iter()) {
            *d = d.min(squared_distance(p, center));
        }
        centroids.push(center.to_vec());
    }
    centroids
}

fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best_distance {
            best_distance = d;
            best = idx;
        }
    }
    best
}

/// Move each centroid to the mean of its members. Empty clusters keep theirs.
fn recenter(points: &[&[f64]], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        let members = points
            .iter()
            .zip(assignments.iter())
            .filter(|(_, a)| **a == cluster)
            .map(|(p, _)| *p);
        let mean = mean_vector(members);
        if !mean.is_empty() {
            *centroid = mean;
        }
    }
}

/// Member contents joined by newlines, trimmed and capped.
pub fn combined_content(members: &[MemoryPoint]) -> String {
    let joined = members
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    clip(joined.trim(), CLUSTER_CONTENT_CHAR_LIMIT)
}

/// The most frequent keywords across members, ties in first-seen order.
pub fn top_keywords(members: &[MemoryPoint], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for keyword in members.iter().flat_map(|m| m.keywords.iter()) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(k, _)| k == keyword) {
            Some((_, n)) => *n += 1,
            None => counts.push((keyword.to_string(), 1)),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(k, _)| k).collect()
}

/// Collapse a cluster into one point.
///
/// `summary` is the regenerated summary of the combined content; when absent
/// the first member's summary is used. Returns `None` for an empty cluster.
pub fn combine_cluster(
    members: &[MemoryPoint],
    cluster_id: i64,
    summary: Option<String>,
) -> Option<MemoryPoint> {
    let first = members.first()?;
    let n = members.len() as f64;
    let mean = |f: fn(&MemoryPoint) -> f64| members.iter().map(f).sum::<f64>() / n;

    Some(MemoryPoint {
        id: 0,
        keywords: top_keywords(members, MAX_CLUSTER_KEYWORDS),
        content: combined_content(members),
        summary: summary.unwrap_or_else(|| first.summary.clone()),
        vector: mean_vector(members.iter().map(|m| m.vector.as_slice())),
        cluster_id: if cluster_id < 0 { UNCLUSTERED } else { cluster_id },
        time_weight: mean(|m| m.time_weight),
        repeat_weight: mean(|m| m.repeat_weight),
        emphasis_weight: mean(|m| m.emphasis_weight),
        total_weight: mean(|m| m.total_weight),
        created_at: members.iter().filter_map(|m| m.created_at).min(),
        updated_at: members.iter().filter_map(|m| m.updated_at).max(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn k_selection_table() {
        assert_eq!(determine_k(2), 2);
        assert_eq!(determine_k(4), 2);
        assert_eq!(determine_k(9), 2);
        assert_eq!(determine_k(10), 3);
        assert_eq!(determine_k(19), 3);
        assert_eq!(determine_k(20), 4);
        assert_eq!(determine_k(49), 4);
        assert_eq!(determine_k(50), 5);
        assert_eq!(determine_k(98), 7);
        assert_eq!(determine_k(1000), 10);
    }

    #[test]
    fn separates_two_obvious_groups() {
        let data: Vec<Vec<f64>> = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.9, 0.1],
            vec![0.1, 0.9],
        ];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let clustering = kmeans(&points, 2, 1).unwrap();
        assert_eq!(clustering.assignments[0], clustering.assignments[2]);
        assert_eq!(clustering.assignments[1], clustering.assignments[3]);
        assert_ne!(clustering.assignments[0], clustering.assignments[1]);
        assert_eq!(clustering.groups().len(), 2);
    }

    #[test]
    fn single_pass_recenters_once() {
        let data: Vec<Vec<f64>> = vec![vec![0.0], vec![10.0], vec![2.0]];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let clustering = kmeans(&points, 2, 1).unwrap();
        assert_eq!(clustering.assignments, vec![0, 1, 0]);
        assert_eq!(clustering.centroids, vec![vec![1.0], vec![10.0]]);
    }

    #[test]
    fn identical_points_leave_empty_cluster() {
        let data: Vec<Vec<f64>> = vec![vec![1.0, 1.0]; 3];
        let points: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
        let clustering = kmeans(&points, 2, 3).unwrap();
        assert_eq!(clustering.groups().len(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        let a = [1.0, 0.0];
        let b = [1.0];
        assert!(kmeans(&[&a[..], &b[..]], 2, 1).is_err());
        assert!(kmeans(&[&a[..]], 2, 1).is_err());
        assert!(kmeans(&[&a[..], &a[..]], 0, 1).is_err());
    }

    #[test]
    fn top_keywords_by_frequency_then_first_seen() {
        let members = vec![
            MemoryPoint::new(["rain", "weather", "umbrella"], "c", "s"),
            MemoryPoint::new(["sun", "weather"], "c", "s"),
            MemoryPoint::new(["sun"], "c", "s"),
        ];
        assert_eq!(
            top_keywords(&members, 10),
            vec!["weather", "sun", "rain", "umbrella"]
        );
        assert_eq!(top_keywords(&members, 1), vec!["weather"]);
    }

    #[test]
    fn combine_averages_and_spans_time() {
        let now = Utc::now();
        let mut a = MemoryPoint::new(["rain"], "it rains", "rain");
        a.vector = vec![1.0, 0.0];
        a.total_weight = 1.0;
        a.time_weight = 0.5;
        a.created_at = Some(now - Duration::days(2));
        a.updated_at = Some(now - Duration::days(1));

        let mut b = MemoryPoint::new(["rain", "cold"], "it is cold", "cold");
        b.vector = vec![0.0, 1.0];
        b.total_weight = 2.0;
        b.time_weight = 1.0;
        b.created_at = Some(now - Duration::days(1));
        b.updated_at = Some(now);

        let combined = combine_cluster(&[a, b], 1, None).unwrap();
        assert_eq!(combined.content, "it rains\nit is cold");
        assert_eq!(combined.summary, "rain");
        assert_eq!(combined.keywords, vec!["rain", "cold"]);
        assert_eq!(combined.vector, vec![0.5, 0.5]);
        assert_eq!(combined.total_weight, 1.5);
        assert_eq!(combined.time_weight, 0.75);
        assert_eq!(combined.cluster_id, 1);
        assert_eq!(combined.created_at, Some(now - Duration::days(2)));
        assert_eq!(combined.updated_at, Some(now));
    }

    #[test]
    fn combine_caps_content_and_uses_given_summary() {
        let members: Vec<MemoryPoint> = (0..5)
            .map(|_| MemoryPoint::new(["x"], "y".repeat(400), "first"))
            .collect();
        let combined = combine_cluster(&members, 0, Some("regenerated".into())).unwrap();
        assert_eq!(combined.content.chars().count(), CLUSTER_CONTENT_CHAR_LIMIT);
        assert_eq!(combined.summary, "regenerated");
        assert!(combine_cluster(&[], 0, None).is_none());
    }
}
