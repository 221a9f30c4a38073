//! Multimodal analyzer API client.
//!
//! The analyzer is treated as an opaque `analyze(video, prompt) -> text`
//! service; this module provides the production HTTP client plus the
//! [`VideoAnalyzer`] seam the detection driver and tests program
//! against.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, info};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reference to a video already uploaded to the analyzer's file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRef {
    /// File-store URI of the cached upload.
    pub file_uri: String,
    /// MIME type of the upload.
    pub mime_type: String,
}

impl VideoRef {
    /// Creates a reference to an `.mp4` upload.
    #[must_use]
    pub fn mp4(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            mime_type: "video/mp4".to_string(),
        }
    }
}

/// Abstraction over the multimodal analyzer call.
pub trait VideoAnalyzer: Send + Sync {
    /// Analyzes `video` with `prompt` and returns the raw response text.
    fn analyze(
        &self,
        video: &VideoRef,
        prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Configuration for the analyzer client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model to use.
    pub model: String,
    /// Base URL of the generate-content endpoint.
    pub endpoint: String,
    /// Request timeout in seconds. The driver applies its own
    /// per-attempt timeout on top; this is a transport-level bound.
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: API_BASE.to_string(),
            timeout_seconds: 180,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    #[serde(rename = "fileData")]
    FileData {
        #[serde(rename = "fileUri")]
        file_uri: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    #[serde(rename = "text")]
    Text(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| &content.parts)
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::FileData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn block_signal(&self) -> Option<String> {
        if let Some(feedback) = &self.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Some(reason.clone());
            }
        }
        self.candidates
            .iter()
            .filter_map(|c| c.finish_reason.as_deref())
            .find(|reason| *reason == "SAFETY" || *reason == "PROHIBITED_CONTENT")
            .map(ToString::to_string)
    }
}

/// Production analyzer client.
pub struct AnalyzerClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl AnalyzerClient {
    /// Creates a new analyzer client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::InvalidApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, http })
    }

    async fn call_api(&self, video: &VideoRef, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileData {
                        file_uri: video.file_uri.clone(),
                        mime_type: video.mime_type.clone(),
                    },
                    Part::Text(prompt.to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.2,
            },
        };

        let url = format!(
            "{}/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        debug!("Sending window analysis request to {}", self.config.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Received response with status: {status}");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::InvalidApiKey);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::ApiStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            Error::SchemaValidation(format!("failed to parse analyzer envelope: {e}"))
        })?;

        Self::extract_text(&body)
    }

    fn extract_text(body: &GenerateResponse) -> Result<String> {
        if let Some(reason) = body.block_signal() {
            return Err(Error::SafetyBlocked { reason });
        }

        let text = body.text();
        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }

        info!("Received {} chars of analysis", text.len());
        Ok(text)
    }
}

impl VideoAnalyzer for AnalyzerClient {
    async fn analyze(&self, video: &VideoRef, prompt: &str) -> Result<String> {
        self.call_api(video, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_empty_api_key() {
        let config = ClientConfig::default();
        assert!(matches!(
            AnalyzerClient::new(config),
            Err(Error::InvalidApiKey)
        ));
    }

    #[test]
    fn client_accepts_valid_config() {
        let config = ClientConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        assert!(AnalyzerClient::new(config).is_ok());
    }

    #[test]
    fn extract_text_joins_candidate_parts() {
        let body = GenerateResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![
                        Part::Text("{\"events\"".to_string()),
                        Part::Text(": []}".to_string()),
                    ],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        };

        assert_eq!(AnalyzerClient::extract_text(&body).unwrap(), "{\"events\": []}");
    }

    #[test]
    fn block_reason_is_safety_error() {
        let body = GenerateResponse {
            candidates: Vec::new(),
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
        };

        assert!(matches!(
            AnalyzerClient::extract_text(&body),
            Err(Error::SafetyBlocked { .. })
        ));
    }

    #[test]
    fn safety_finish_reason_is_safety_error() {
        let body = GenerateResponse {
            candidates: vec![Candidate {
                content: None,
                finish_reason: Some("SAFETY".to_string()),
            }],
            prompt_feedback: None,
        };

        assert!(matches!(
            AnalyzerClient::extract_text(&body),
            Err(Error::SafetyBlocked { .. })
        ));
    }

    #[test]
    fn empty_candidates_is_empty_response() {
        let body = GenerateResponse {
            candidates: Vec::new(),
            prompt_feedback: None,
        };

        assert!(matches!(
            AnalyzerClient::extract_text(&body),
            Err(Error::EmptyResponse)
        ));
    }
}
