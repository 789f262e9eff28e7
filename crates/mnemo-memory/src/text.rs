// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text heuristics used when no language model is available, plus the
//! keyword overlap score used by retrieval.
//!
//! Lengths are counted in characters, never bytes, so clipping cannot split
//! a multi-byte character.

use mnemo_core::ConversationLog;

/// Cap applied to a rendered conversation.
pub const CONVERSATION_CHAR_LIMIT: usize = 1000;

/// Cap applied to the combined content of a cluster.
pub const CLUSTER_CONTENT_CHAR_LIMIT: usize = 1500;

/// Length of the heuristic summary before the ellipsis.
pub const SUMMARY_CHAR_LIMIT: usize = 200;

/// Maximum number of heuristic keywords.
pub const MAX_FALLBACK_KEYWORDS: usize = 5;

const ELLIPSIS: &str = "...";

/// Characters stripped from token edges: ASCII and full-width punctuation.
const TRIM_CHARS: &[char] = &[
    ',', '.', '!', '?', ';', ':', '"', '\'', '(', ')', '[', ']', '，', '。', '！', '？', '、',
    '；', '：', '“', '”', '‘', '’', '（', '）',
];

/// Clip `text` so the result, ellipsis included, is at most `max_chars` long.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Heuristic summary: the first 200 characters followed by an ellipsis.
pub fn fallback_summary(text: &str) -> String {
    if text.chars().count() <= SUMMARY_CHAR_LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(SUMMARY_CHAR_LIMIT).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Heuristic keywords: distinct whitespace tokens with punctuation trimmed,
/// at least two characters long, first five only.
pub fn simple_tokenize(text: &str) -> Vec<String> {
    let tokens = text
        .split_whitespace()
        .map(|token| token.trim_matches(TRIM_CHARS))
        .filter(|token| token.chars().count() >= 2);
    let mut keywords = normalize_keywords(tokens);
    keywords.truncate(MAX_FALLBACK_KEYWORDS);
    keywords
}

/// Render a log as `sender: content` lines, trimmed and clipped.
pub fn render_conversation(log: &ConversationLog) -> String {
    let mut text = String::new();
    for message in &log.messages {
        text.push_str(&message.sender);
        text.push_str(": ");
        text.push_str(&message.content);
        text.push('\n');
    }
    clip(text.trim(), CONVERSATION_CHAR_LIMIT)
}

/// Trim, drop empties, and dedupe keywords while keeping first-seen order.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref().trim();
        if !keyword.is_empty() && !out.iter().any(|k| k == keyword) {
            out.push(keyword.to_string());
        }
    }
    out
}

/// Share of a point's keywords that match the query terms.
///
/// A keyword matches when it contains the (lowercased) terms or the terms
/// contain it. The count is divided by the smaller of the keyword count and
/// the number of query tokens, so a one-word query that hits one of several
/// keywords scores `1.0`. The result is clamped to `[0, 1]`.
pub fn keyword_overlap(keywords: &[String], terms: &str) -> f64 {
    let terms = terms.trim().to_lowercase();
    if terms.is_empty() {
        return 0.0;
    }

    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return 0.0;
    }

    let matched = keywords
        .iter()
        .filter(|k| terms.contains(k.as_str()) || k.contains(terms.as_str()))
        .count();

    let query_tokens = terms
        .split(|c: char| c.is_whitespace() || TRIM_CHARS.contains(&c))
        .filter(|t| !t.is_empty())
        .count()
        .max(1);
    let denominator = keywords.len().min(query_tokens);

    (matched as f64 / denominator as f64).min(1.0)
}
