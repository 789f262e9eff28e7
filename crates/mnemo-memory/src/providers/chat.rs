// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mnemo_config::model::LlmConfig;
use mnemo_core::{AdapterType, HealthStatus, MnemoError, PluginAdapter, Summarizer};

use crate::text::{normalize_keywords, simple_tokenize};

const SUMMARY_PROMPT: &str =
    "Condense the following conversation into one concise summary that keeps the key information:";

const KEYWORD_PROMPT: &str = "Extract the 3-5 most important keywords from the following conversation. \
Reply with a JSON object of the form {\"keywords\": [\"...\"]} and nothing else.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct KeywordReply {
    keywords: Vec<String>,
}

/// OpenAI-compatible chat client producing summaries and keywords.
#[derive(Debug, Clone)]
pub struct ChatSummarizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    summary_model: String,
    keyword_model: String,
    timeout: Duration,
}

impl ChatSummarizer {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        summary_model: impl Into<String>,
        keyword_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MnemoError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            summary_model: summary_model.into(),
            keyword_model: keyword_model.into(),
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, MnemoError> {
        Self::new(
            &config.base_url,
            Some(config.api_key.clone()),
            config.summary_model.clone(),
            config.keyword_model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// First choice's content, or `None` when the reply has no choices.
    async fn complete(
        &self,
        model: &str,
        system: &str,
        text: &str,
        json_reply: bool,
    ) -> Result<Option<String>, MnemoError> {
        let request = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            response_format: json_reply.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                MnemoError::Timeout {
                    duration: self.timeout,
                }
            } else {
                MnemoError::Upstream {
                    message: format!("chat request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let status = response.status();
        debug!(status = %status, model, "chat completion response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemoError::upstream(format!(
                "chat server returned {status}: {body}"
            )));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| MnemoError::Upstream {
            message: format!("failed to parse chat response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(reply.choices.into_iter().next().map(|c| c.message.content))
    }
}

/// Parse a `{"keywords": [...]}` reply, tolerating a fenced code block.
fn parse_keywords(reply: &str) -> Option<Vec<String>> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str::<KeywordReply>(body.trim())
        .ok()
        .map(|r| normalize_keywords(r.keywords))
}

#[async_trait]
impl PluginAdapter for ChatSummarizer {
    fn name(&self) -> &str {
        "chat-summarizer"
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
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, MnemoError> {
        let reply = self
            .complete(&self.summary_model, SUMMARY_PROMPT, text, false)
            .await?;
        Ok(reply.unwrap_or_else(|| text.to_string()))
    }

    async fn extract_keywords(&self, text: &str) -> Result<Vec<String>, MnemoError> {
        let reply = self
            .complete(&self.keyword_model, KEYWORD_PROMPT, text, true)
            .await?;
        match reply.as_deref().and_then(parse_keywords) {
            Some(keywords) => Ok(keywords),
            None => {
                warn!("keyword reply was not a keyword object, using tokenizer");
                Ok(simple_tokenize(text))
            }
        }
    }
}
