//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (user config dir) and project (.contextstudio/) level configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::{cache, estimation, generation, ledger, network, scan};
use crate::pricing::Currency;
use crate::types::{Result, StudioError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Directory scanning rules
    pub scan: ScanConfig,

    /// Token estimation settings
    pub estimation: EstimationConfig,

    /// Currency and exchange rates
    pub pricing: PricingConfig,

    /// Generation service settings
    pub llm: LlmConfig,

    /// Retry and concurrency settings
    pub generation: GenerationConfig,

    /// Cost history settings
    pub ledger: LedgerConfig,

    /// Model catalog cache settings
    pub cache: CacheConfig,

    /// Custom prompt overrides
    pub prompts: PromptsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            scan: ScanConfig::default(),
            estimation: EstimationConfig::default(),
            pricing: PricingConfig::default(),
            llm: LlmConfig::default(),
            generation: GenerationConfig::default(),
            ledger: LedgerConfig::default(),
            cache: CacheConfig::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `StudioError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.scan.max_depth == 0 {
            return Err(StudioError::Config(
                "scan.max_depth must be greater than 0".to_string(),
            ));
        }

        if self.scan.token_factor == 0 {
            return Err(StudioError::Config(
                "scan.token_factor must be greater than 0".to_string(),
            ));
        }

        let multiplier = self.estimation.output_multiplier;
        if multiplier.is_nan() || multiplier < 0.0 {
            return Err(StudioError::Config(format!(
                "estimation.output_multiplier must be non-negative, got {}",
                self.estimation.output_multiplier
            )));
        }

        if let Some((code, rate)) = self
            .pricing
            .exchange_rates
            .iter()
            .find(|(_, rate)| rate.is_nan() || **rate <= 0.0)
        {
            return Err(StudioError::Config(format!(
                "pricing.exchange_rates.{} must be positive, got {}",
                code, rate
            )));
        }

        for code in self.pricing.exchange_rates.keys() {
            code.parse::<Currency>().map_err(StudioError::Config)?;
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(StudioError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(StudioError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.max_attempts == 0 {
            return Err(StudioError::Config(
                "generation.max_attempts must be greater than 0".to_string(),
            ));
        }

        if !(1..=generation::MAX_WORKERS).contains(&self.generation.workers) {
            return Err(StudioError::Config(format!(
                "generation.workers must be between 1 and {}, got {}",
                generation::MAX_WORKERS,
                self.generation.workers
            )));
        }

        if self.cache.cache_hours <= 0 {
            return Err(StudioError::Config(format!(
                "cache.cache_hours must be greater than 0, got {}",
                self.cache.cache_hours
            )));
        }

        if self.ledger.max_entries == 0 {
            return Err(StudioError::Config(
                "ledger.max_entries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum directory depth below the root
    pub max_depth: usize,

    /// Maximum file size in bytes
    pub max_file_size: u64,

    /// Directory names that are never descended into
    pub ignored_dirs: Vec<String>,

    /// Extensions eligible for scanning (with or without leading dot)
    pub supported_extensions: Vec<String>,

    /// Dot-files that are still scanned
    pub allowed_dotfiles: Vec<String>,

    /// Characters per token for the scan-time estimate
    pub token_factor: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: scan::MAX_DEPTH,
            max_file_size: scan::MAX_FILE_SIZE,
            ignored_dirs: scan::IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
            supported_extensions: scan::SUPPORTED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_dotfiles: scan::ALLOWED_DOTFILES.iter().map(|s| s.to_string()).collect(),
            token_factor: scan::TOKEN_FACTOR,
        }
    }
}

// =============================================================================
// Estimation & Pricing Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Expected output tokens per input token
    pub output_multiplier: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            output_multiplier: estimation::DEFAULT_OUTPUT_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Display currency
    pub currency: Currency,

    /// Overrides of the USD exchange table, keyed by currency code
    pub exchange_rates: BTreeMap<String, f64>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Eur,
            exchange_rates: BTreeMap::new(),
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,

    /// API key (falls back to GEMINI_API_KEY / GOOGLE_API_KEY).
    /// Never serialized to output.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL override
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Output token cap
    pub max_output_tokens: u32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: crate::constants::pricing::DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: generation::TEMPERATURE,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum attempts per document
    pub max_attempts: u32,

    /// Linear backoff base (seconds)
    pub base_delay_secs: u64,

    /// Concurrent documents in flight (1-2)
    pub workers: usize,

    /// Stop retrying on authentication / bad-request failures
    pub stop_on_non_retryable: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: generation::MAX_ATTEMPTS,
            base_delay_secs: generation::BASE_DELAY_SECS,
            workers: generation::MAX_WORKERS,
            stop_on_non_retryable: false,
        }
    }
}

// =============================================================================
// Persistence Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Ledger file (default: user data dir)
    pub path: Option<PathBuf>,

    /// Maximum retained entries
    pub max_entries: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: ledger::MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Model list cache file (default: user cache dir)
    pub models_path: Option<PathBuf>,

    /// Validity window in hours
    pub cache_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            models_path: None,
            cache_hours: cache::MODELS_CACHE_HOURS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Custom prompts JSON (default: user config dir)
    pub custom_prompts_path: Option<PathBuf>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.scan.max_depth, 20);
        assert_eq!(config.scan.max_file_size, 1_000_000);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.ledger.max_entries, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.generation.workers = 3;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pricing.exchange_rates.insert("XYZ".into(), 1.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pricing.exchange_rates.insert("EUR".into(), 0.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.cache_hours = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.cache_hours = -24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret-key".to_string());

        let debug = format!("{:?}", config.llm);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
