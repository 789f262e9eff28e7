// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock summarizer for deterministic testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemo_core::{AdapterType, HealthStatus, MnemoError, PluginAdapter, Summarizer};

/// A summarizer with queued replies and failure injection.
///
/// Queued summaries are popped in order. Without a queued summary the reply
/// is `"summary: "` plus the first line of the text. Keywords are the first
/// three alphabetic words of at least three characters, lowercased.
pub struct MockSummarizer {
    summaries: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self {
            summaries: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_summaries(summaries: Vec<String>) -> Self {
        Self {
            summaries: Mutex::new(VecDeque::from(summaries)),
            ..Self::new()
        }
    }

    /// Total `summarize` and `extract_keywords` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn begin_call(&self) -> Result<(), MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemoError::upstream("mock summarizer failure injected"));
        }
        Ok(())
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSummarizer {
    fn name(&self) -> &str {
        "mock-summarizer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Summarizer
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, MnemoError> {
        self.begin_call()?;
        if let Some(summary) = self.summaries.lock().await.pop_front() {
            return Ok(summary);
        }
        let first_line = text.lines().next().unwrap_or_default().trim();
        Ok(format!("summary: {first_line}"))
    }

    async fn extract_keywords(&self, text: &str) -> Result<Vec<String>, MnemoError> {
        self.begin_call()?;
        Ok(text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| w.chars().count() >= 3)
            .map(str::to_lowercase)
            .take(3)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_then_generated_summaries() {
        let s = MockSummarizer::with_summaries(vec!["first".into()]);
        assert_eq!(s.summarize("a\nb").await.unwrap(), "first");
        assert_eq!(s.summarize("line one\nline two").await.unwrap(), "summary: line one");
        assert_eq!(s.calls(), 2);
    }

    #[tokio::test]
    async fn keywords_are_first_long_words() {
        let s = MockSummarizer::new();
        assert_eq!(
            s.extract_keywords("user: Is it going to RAIN today? yes").await.unwrap(),
            vec!["user", "going", "rain"]
        );
    }

    #[tokio::test]
    async fn failure_injection() {
        let s = MockSummarizer::new();
        s.set_failing(true);
        assert!(s.summarize("x").await.is_err());
        assert!(s.extract_keywords("x").await.is_err());
    }
}
