//! Decision source backed by the Gemini `generateContent` REST endpoint.

use crate::prompt::build_prompt;
use async_trait::async_trait;
use civitas_core::config::OracleConfig;
use civitas_core::{DecisionError, DecisionSource};
use civitas_data::Agent;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, DecisionError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(DecisionError::EmptyResponse);
        }
        Ok(text)
    }
}

pub struct GeminiOracle {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiOracle {
    /// Reads the API key from the environment variable named in `config`.
    pub fn from_config(config: &OracleConfig) -> Result<Self, DecisionError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DecisionError::unavailable(format!("{} is not set", config.api_key_env)))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &OracleConfig, api_key: String) -> Result<Self, DecisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DecisionError::unavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// One request per decision. Failures are not retried; the agent sits the day out.
    async fn generate(&self, prompt: &str) -> Result<String, DecisionError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DecisionError::upstream(format!("Gemini request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DecisionError::upstream(format!("Gemini returned {status}")));
        }
        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| DecisionError::upstream(format!("Failed to parse response: {e}")))?;
        parsed.into_text()
    }
}

#[async_trait]
impl DecisionSource for GeminiOracle {
    async fn decide(&self, agent: &Agent, situation: &str) -> Result<String, DecisionError> {
        let prompt = build_prompt(agent, situation);
        debug!(agent = %agent.id, model = %self.model, "Requesting decision");
        self.generate(&prompt).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Local endpoint answering every request with `status_line`; returns the base URL and a hit counter.
    async fn stub_endpoint(status_line: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = vec![0u8; 16 * 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}/v1beta"), hits)
    }

    fn local_oracle(endpoint: String) -> GeminiOracle {
        let config = OracleConfig {
            endpoint,
            ..OracleConfig::default()
        };
        let mut oracle = GeminiOracle::with_api_key(&config, "k".into()).unwrap();
        oracle.client = Client::builder().no_proxy().build().unwrap();
        oracle
    }

    #[tokio::test]
    async fn test_server_error_fails_after_one_request() {
        let (endpoint, hits) = stub_endpoint("503 Service Unavailable").await;
        let oracle = local_oracle(endpoint);
        let result = oracle.generate("Should the treasury act?").await;
        assert!(matches!(result, Err(DecisionError::Upstream(_))), "got {result:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_fails_after_one_request() {
        let (endpoint, hits) = stub_endpoint("429 Too Many Requests").await;
        let oracle = local_oracle(endpoint);
        assert!(matches!(
            oracle.generate("Should the treasury act?").await,
            Err(DecisionError::Upstream(_))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let config = OracleConfig {
            api_key_env: "CIVITAS_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..OracleConfig::default()
        };
        assert!(matches!(
            GeminiOracle::from_config(&config),
            Err(DecisionError::Unavailable(_))
        ));
    }

    #[test]
    fn test_response_text_is_joined() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"ACTION: Hold "},{"text":"hearings"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "ACTION: Hold hearings");
    }

    #[test]
    fn test_empty_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(parsed.into_text(), Err(DecisionError::EmptyResponse));
    }

    #[test]
    fn test_url_shape() {
        let config = OracleConfig {
            endpoint: "https://example.test/v1beta/".into(),
            ..OracleConfig::default()
        };
        let oracle = GeminiOracle::with_api_key(&config, "k".into()).unwrap();
        assert_eq!(
            oracle.url(),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
