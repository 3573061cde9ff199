use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Sampling settings for a single `generateContent` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub candidate_count: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            candidate_count: 1,
            max_output_tokens: 500,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Returns the raw JSON response; reply extraction lives in `crate::chat`
/// because the candidate shape varies between API versions.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration carrying the key, model and base URL.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create Gemini client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single-turn prompt and returns the response body.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The full prompt text, grounding included.
    /// * `generation` - Sampling settings.
    ///
    /// # Returns
    ///
    /// * `Result<serde_json::Value, AppError>` - The raw `generateContent` response.
    pub async fn generate_content(
        &self,
        prompt: &str,
        generation: GenerationConfig,
    ) -> Result<Value, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::info!(
            "Calling Gemini {} (prompt: {} chars, max tokens: {})",
            self.model,
            prompt.len(),
            generation.max_output_tokens
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: generation,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AppError::from)
            .context("Gemini request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        let data: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Gemini response: {}", e))
        })?;

        tracing::debug!("Full Gemini response: {}", data);
        Ok(data)
    }
}
