use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::TextGenerator;
use crate::Result;

/// Errors returned by the Gemini API client
#[derive(thiserror::Error, Debug)]
pub enum GeminiError {
    #[error("Failed to send request to Gemini API: {0}")]
    RequestFailed(String),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse Gemini API response: {0}")]
    ParseError(String),

    #[error("Gemini returned no text{}", .0.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),
}

/// Gemini `generateContent` client
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key sent in the `x-goog-api-key` header
    api_key: String,
    /// Base endpoint, e.g. https://generativelanguage.googleapis.com
    endpoint: String,
    /// Model name, e.g. gemini-1.5-flash
    model: String,
}

/// Gemini request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
}

/// One turn of conversation
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Gemini response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentRequest {
    /// A single user turn holding `prompt`
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Text of the first candidate, or why there is none
    pub fn into_text(self) -> std::result::Result<String, GeminiError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(GeminiError::EmptyResponse(block_reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse(
                candidate.finish_reason.or(block_reason),
            ));
        }

        Ok(text)
    }
}

impl Gemini {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.model)
        )
    }

    /// Send a `generateContent` request
    pub async fn complete(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, GeminiError> {
        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GeminiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            tracing::error!("Gemini API error ({}): {}", status, message);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Sending {} character prompt to {}", prompt.len(), self.model);

        let response = self
            .complete(&GenerateContentRequest::from_prompt(prompt))
            .await?;
        let text = response.into_text()?;

        tracing::debug!("{} returned {} characters", self.model, text.len());
        Ok(text)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
