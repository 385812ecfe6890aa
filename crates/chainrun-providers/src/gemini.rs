use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chainrun_engine::{GenerationError, TextGenerator};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// [`TextGenerator`] backed by the Gemini `generateContent` endpoint.
///
/// One prompt in, one completion out. Retries are the engine's job, so a
/// failed request surfaces immediately as [`GenerationError`].
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

// Gemini API request format
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    /// Parts may be missing if the response was truncated (e.g., MAX_TOKENS)
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
}

impl GeminiGenerator {
    /// Create a generator against the production endpoint with the default
    /// model.
    pub fn new(api_key: String) -> Self {
        Self::with_config(None, api_key, None)
    }

    /// Create a generator with an explicit base URL and model.
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the Gemini API (defaults to the v1beta endpoint)
    /// * `api_key` - Google API key
    /// * `model` - Model name (defaults to `gemini-2.0-flash`)
    pub fn with_config(base_url: Option<String>, api_key: String, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        }
    }

    fn get_api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.get_api_url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Provider {
                message: e.to_string(),
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GenerationError::InvalidResponse {
                message: format!("failed to read response: {e}"),
            })?;

        if !status.is_success() {
            return Err(GenerationError::Provider {
                message: format!("Gemini API error ({status}): {response_text}"),
            });
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                GenerationError::InvalidResponse {
                    message: format!(
                        "failed to parse Gemini response: {e}. Raw response: {}",
                        if response_text.len() > 500 {
                            format!("{}...", &response_text[..500])
                        } else {
                            response_text.clone()
                        }
                    ),
                }
            })?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| GenerationError::InvalidResponse {
                message: "response contained no candidates".to_string(),
            })?;

        tracing::debug!(
            model = %self.model,
            chars = text.len(),
            "gemini completion received"
        );

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
