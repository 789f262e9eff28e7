// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation consolidation: logs become weighted points, points are
//! embedded and grouped with k-means, and each group is stored as one
//! combined point.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use mnemo_core::{ConsolidationReport, ConversationLog, MemoryPoint, MnemoError, Scene};

use crate::cluster::{combine_cluster, combined_content, determine_k, kmeans};
use crate::engine::MemoryEngine;
use crate::metrics;
use crate::text::{fallback_summary, normalize_keywords, render_conversation, simple_tokenize};

pub(crate) async fn consolidate(
    engine: &MemoryEngine,
    logs: &[ConversationLog],
) -> Result<ConsolidationReport, MnemoError> {
    let mut report = ConsolidationReport {
        logs: logs.len(),
        ..ConsolidationReport::default()
    };
    if logs.is_empty() {
        return Ok(report);
    }

    let now = Utc::now();
    let existing = engine.repeat_candidates().await?;

    let mut points = Vec::with_capacity(logs.len());
    for log in logs {
        let text = render_conversation(log);
        if text.is_empty() {
            debug!(log = %log.id, "skipping empty conversation");
            continue;
        }
        let mut point = MemoryPoint::new(
            keywords_for(engine, &text).await,
            text.clone(),
            summary_for(engine, log, &text).await,
        );
        point.created_at = Some(log.start_time);
        point.updated_at = Some(log.end_time);
        engine.weigh_against(&mut point, &text, Scene::Chat, now, &existing);
        points.push(point);
    }

    embed_points(engine, &mut points).await;

    let embedded: Vec<usize> = (0..points.len())
        .filter(|&i| !points[i].vector.is_empty())
        .collect();
    if embedded.len() < 2 {
        debug!(embedded = embedded.len(), "too few embedded points to cluster");
        return store_individually(engine, points, report).await;
    }

    let k = determine_k(embedded.len());
    let vectors: Vec<&[f64]> = embedded.iter().map(|&i| points[i].vector.as_slice()).collect();
    let clustering = match kmeans(&vectors, k, engine.config().kmeans_passes) {
        Ok(clustering) => clustering,
        Err(e) => {
            warn!(error = %e, "clustering failed, storing points individually");
            return store_individually(engine, points, report).await;
        }
    };

    let groups = clustering.groups();
    report.clusters = groups.len();
    metrics::record_clusters(groups.len());

    let mut combined = Vec::with_capacity(groups.len());
    for (cluster, members) in &groups {
        let members: Vec<MemoryPoint> = members
            .iter()
            .map(|&m| points[embedded[m]].clone())
            .collect();
        let summary = regenerate_summary(engine, &members).await;
        if let Some(point) = combine_cluster(&members, *cluster as i64, summary) {
            combined.push(point);
        }
    }

    // Points that could not be embedded are kept as they are.
    let leftovers: Vec<MemoryPoint> = points
        .into_iter()
        .filter(|p| p.vector.is_empty())
        .collect();
    combined.extend(leftovers);

    let report = store_individually(engine, combined, report).await?;
    info!(
        logs = report.logs,
        clusters = report.clusters,
        stored = report.stored,
        failed = report.failed,
        "conversations consolidated"
    );
    Ok(report)
}

async fn keywords_for(engine: &MemoryEngine, text: &str) -> Vec<String> {
    if let Some(summarizer) = engine.summarizer() {
        match summarizer.extract_keywords(text).await {
            Ok(keywords) => {
                let keywords = normalize_keywords(keywords);
                if !keywords.is_empty() {
                    return keywords;
                }
            }
            Err(e) => warn!(error = %e, "keyword extraction failed, using tokenizer"),
        }
    }
    simple_tokenize(text)
}

async fn summary_for(engine: &MemoryEngine, log: &ConversationLog, text: &str) -> String {
    if let Some(topic) = log.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return topic.to_string();
    }
    if let Some(summarizer) = engine.summarizer() {
        match summarizer.summarize(text).await {
            Ok(summary) if !summary.trim().is_empty() => return summary,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "summarization failed, using heuristic summary"),
        }
    }
    fallback_summary(text)
}

/// Summary of the combined member content, or `None` to keep the first member's.
async fn regenerate_summary(engine: &MemoryEngine, members: &[MemoryPoint]) -> Option<String> {
    let summarizer = engine.summarizer()?;
    match summarizer.summarize(&combined_content(members)).await {
        Ok(summary) if !summary.trim().is_empty() => Some(summary),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "cluster summarization failed, keeping member summary");
            None
        }
    }
}

/// Batch-embed every point; if the batch fails, embed one by one and leave
/// failures unembedded.
async fn embed_points(engine: &MemoryEngine, points: &mut [MemoryPoint]) {
    let Some(embeddings) = engine.embeddings() else {
        return;
    };
    if points.is_empty() {
        return;
    }
    let texts: Vec<String> = points.iter().map(MemoryPoint::embedding_text).collect();

    match embeddings.embed_batch(&texts).await {
        Ok(vectors) => {
            for (point, vector) in points.iter_mut().zip(vectors) {
                point.vector = vector;
            }
        }
        Err(e) => {
            warn!(error = %e, "batch embedding failed, embedding points one by one");
            for (point, text) in points.iter_mut().zip(&texts) {
                match embeddings.embed(text).await {
                    Ok(vector) => point.vector = vector,
                    Err(e) => debug!(error = %e, "point left unembedded"),
                }
            }
        }
    }
}

/// Record each point. Storage failures are counted; if nothing could be
/// stored the first failure is returned.
async fn store_individually(
    engine: &MemoryEngine,
    points: Vec<MemoryPoint>,
    mut report: ConsolidationReport,
) -> Result<ConsolidationReport, MnemoError> {
    let mut first_error = None;
    for point in points {
        match engine.record_point(point).await {
            Ok(_) => report.stored += 1,
            Err(e) => {
                error!(error = %e, "failed to store consolidated memory");
                report.failed += 1;
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) if report.stored == 0 => Err(e),
        _ => Ok(report),
    }
}
