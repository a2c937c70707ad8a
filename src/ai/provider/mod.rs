//! Text Generation Provider Abstraction
//!
//! Defines the [`TextGenerator`] trait: the outbound boundary to a remote
//! text-in/text-out service. The service is treated as a black box that may
//! fail transiently; retry policy lives in the orchestrator, not here.

mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::constants::generation;
use crate::types::{Result, StudioError};

/// Sampling parameters passed with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: generation::TEMPERATURE,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }
}

impl GenerationParams {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Remote text generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt` with `model`
    async fn generate(&self, model: &str, prompt: &str, params: &GenerationParams)
    -> Result<String>;

    /// Models that support text generation
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Shared generator for concurrent document generation
pub type SharedGenerator = Arc<dyn TextGenerator>;

/// Create a generator from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedGenerator> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        other => Err(StudioError::Config(format!(
            "Unknown provider: {}. Supported: gemini",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, StudioError::Config(_)));
    }

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_output_tokens, 8192);
    }
}
