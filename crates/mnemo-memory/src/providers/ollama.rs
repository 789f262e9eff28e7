// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider backed by an Ollama server's `/api/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mnemo_config::model::EmbeddingConfig;
use mnemo_core::{AdapterType, EmbeddingProvider, HealthStatus, MnemoError, PluginAdapter};

/// Default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "nomic-embed-text";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f64>,
}

/// HTTP client for Ollama embeddings.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaEmbedder {
    /// Blank `base_url` or `model` fall back to the defaults. A trailing `/`
    /// and a trailing `/v1` are stripped from the URL.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, MnemoError> {
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim()
        };
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            model.trim()
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MnemoError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: strip_api_suffix(base_url),
            model: model.to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, MnemoError> {
        Self::new(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn strip_api_suffix(url: &str) -> String {
    let url = url.trim_end_matches('/');
    url.strip_suffix("/v1").unwrap_or(url).to_string()
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemoError> {
        let url = format!("{}/api/tags", self.base_url);
        Ok(match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => HealthStatus::Healthy,
            Ok(resp) => HealthStatus::Degraded(format!("server returned {}", resp.status())),
            Err(e) => HealthStatus::Unhealthy(format!("unreachable: {e}")),
        })
    }

    async fn shutdown(&self) -> Result<(), MnemoError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, MnemoError> {
        if text.is_empty() {
            return Err(MnemoError::InvalidInput("cannot embed empty text".into()));
        }

        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MnemoError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    MnemoError::Upstream {
                        message: format!("embedding request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemoError::upstream(format!(
                "embedding server returned {status}: {body}"
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| MnemoError::Upstream {
            message: format!("failed to parse embedding response: {e}"),
            source: Some(Box::new(e)),
        })?;
        if body.embedding.is_empty() {
            return Err(MnemoError::upstream("empty embedding returned"));
        }

        debug!(model = %self.model, dim = body.embedding.len(), "embedding generated");
        Ok(body.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(base: &str) -> OllamaEmbedder {
        OllamaEmbedder::new(base, "nomic-embed-text", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn url_suffixes_are_stripped() {
        assert_eq!(embedder("http://host:11434/v1/").base_url(), "http://host:11434");
        assert_eq!(embedder("http://host:11434/").base_url(), "http://host:11434");
        assert_eq!(embedder("http://host:11434").base_url(), "http://host:11434");
    }

    #[test]
    fn blank_settings_use_defaults() {
        let e = OllamaEmbedder::new("", " ", Duration::from_secs(1)).unwrap();
        assert_eq!(e.base_url(), DEFAULT_BASE_URL);
        assert_eq!(e.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn posts_model_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_json(serde_json::json!({
                "model": "nomic-embed-text",
                "prompt": "hello"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"embedding": [0.1, 0.2, 0.3]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let v = embedder(&format!("{}/v1", server.uri()))
            .generate_embedding("hello")
            .await
            .unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let err = embedder(&server.uri())
            .generate_embedding("hello")
            .await
            .unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("model not loaded"), "got: {err}");
    }

    #[tokio::test]
    async fn empty_embedding_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = embedder(&server.uri())
            .generate_embedding("hello")
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn empty_text_is_rejected_locally() {
        let err = embedder("http://127.0.0.1:9")
            .generate_embedding("")
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn health_check_uses_tags_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
            .mount(&server)
            .await;
        assert_eq!(
            embedder(&server.uri()).health_check().await.unwrap(),
            HealthStatus::Healthy
        );
    }
}
