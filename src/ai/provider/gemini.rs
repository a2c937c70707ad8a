//! Google Gemini Provider
//!
//! Calls the Generative Language REST API (`generateContent` and
//! `models.list`). The API key travels in the `x-goog-api-key` header and
//! never appears in URLs or logs.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::{GenerationParams, TextGenerator};
use crate::config::LlmConfig;
use crate::constants::network::GEMINI_API_BASE;
use crate::constants::pricing::MODEL_PREFIX;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, StudioError};

const PROVIDER: &str = "gemini";
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];
const GENERATE_METHOD: &str = "generateContent";

pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GeminiProvider {
    /// Build from configuration.
    ///
    /// Fails with a configuration error when no API key is available or the
    /// base URL is not a valid http(s) URL.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            })
            .ok_or_else(|| {
                StudioError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY or llm.api_key in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| GEMINI_API_BASE.to_string());
        let parsed = Url::parse(&api_base)
            .map_err(|e| StudioError::Config(format!("Invalid llm.api_base '{}': {}", api_base, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StudioError::Config(format!(
                "llm.api_base must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StudioError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn model_path(model: &str) -> String {
        if model.starts_with(MODEL_PREFIX) {
            model.to_string()
        } else {
            format!("{}{}", MODEL_PREFIX, model)
        }
    }

    async fn error_from_response(response: reqwest::Response) -> StudioError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        ErrorClassifier::classify_http_status(
            status.as_u16(),
            &format!("Gemini API error ({}): {}", status, message),
            PROVIDER,
        )
        .into()
    }

    fn transport_error(e: reqwest::Error) -> StudioError {
        let category = if e.is_timeout() || e.is_connect() {
            ErrorCategory::Network
        } else {
            ErrorClassifier::classify(&e.to_string(), PROVIDER).category
        };
        LlmError::with_provider(category, format!("Gemini request failed: {}", e), PROVIDER).into()
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let url = format!(
            "{}/{}:{}",
            self.api_base,
            Self::model_path(model),
            GENERATE_METHOD
        );
        info!(
            model = %model,
            prompt_chars = prompt.len(),
            temperature = params.temperature,
            "Generating with Gemini"
        );

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StudioError::LlmApi(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("Prompt blocked by Gemini: {}", reason),
                PROVIDER,
            )
            .into());
        }

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(StudioError::LlmApi(
                "Empty response from Gemini".to_string(),
            ));
        }

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Received Gemini response"
        );
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.api_base);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", self.api_key.expose_secret())
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(Self::transport_error)?;
            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }

            let page: ModelsPage = response
                .json()
                .await
                .map_err(|e| StudioError::LlmApi(format!("Failed to parse model list: {}", e)))?;

            models.extend(
                page.models
                    .into_iter()
                    .filter(|m| m.supported_generation_methods.iter().any(|g| g == GENERATE_METHOD))
                    .map(|m| m.name),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if models.is_empty() {
            warn!("Gemini returned no generateContent-capable models");
        }
        Ok(models)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
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
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
