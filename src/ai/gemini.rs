//! The Gemini-backed [TextModel].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AiError, TextModel};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generates text through the Gemini `generateContent` REST API.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiModel {
    /// Create a model handle using `api_key` and the default model and
    /// request timeout.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AiError> {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    /// Create a model handle targeting a specific Gemini model name.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AiError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api { status, message });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|error| AiError::Malformed(error.to_string()))?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AiError::Malformed("empty completion".to_string()))
    }
}
