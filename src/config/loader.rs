//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (<user config dir>/contextstudio/config.toml)
//! 3. Project config (.contextstudio/config.toml)
//! 4. Environment variables (CONTEXTSTUDIO_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, StudioError};

/// Project data directory name
pub const PROJECT_DIR: &str = ".contextstudio";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CONTEXTSTUDIO_";

const LEDGER_FILE: &str = "cost_history.json";
const MODELS_CACHE_FILE: &str = "models_cache.json";
const CUSTOM_PROMPTS_FILE: &str = "custom_prompts.json";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. CONTEXTSTUDIO_LLM__MODEL -> llm.model
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| StudioError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    fn dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "contextstudio", "contextstudio")
    }

    /// Global config directory
    fn global_dir() -> Option<PathBuf> {
        Self::dirs().map(|d| d.config_dir().to_path_buf())
    }

    /// Global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Global cache directory
    fn global_cache_dir() -> Option<PathBuf> {
        Self::dirs().map(|d| d.cache_dir().to_path_buf())
    }

    /// Global data directory
    fn global_data_dir() -> Option<PathBuf> {
        Self::dirs().map(|d| d.data_dir().to_path_buf())
    }

    /// Project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Project data directory
    fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    /// Ledger file: configured path, else user data dir, else project dir
    pub fn ledger_path(config: &Config) -> PathBuf {
        config.ledger.path.clone().unwrap_or_else(|| {
            Self::global_data_dir()
                .unwrap_or_else(Self::project_dir)
                .join(LEDGER_FILE)
        })
    }

    /// Model catalog cache file
    pub fn models_cache_path(config: &Config) -> PathBuf {
        config.cache.models_path.clone().unwrap_or_else(|| {
            Self::global_cache_dir()
                .unwrap_or_else(Self::project_dir)
                .join(MODELS_CACHE_FILE)
        })
    }

    /// Custom prompts file
    pub fn custom_prompts_path(config: &Config) -> PathBuf {
        config.prompts.custom_prompts_path.clone().unwrap_or_else(|| {
            Self::global_dir()
                .unwrap_or_else(Self::project_dir)
                .join(CUSTOM_PROMPTS_FILE)
        })
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        let config = Self::load().unwrap_or_default();

        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            println!("  Global:   {} {}", mark(&global), global.display());
        } else {
            println!("  Global:   (not available)");
        }

        let project = Self::project_config_path();
        println!("  Project:  {} {}", mark(&project), project.display());

        let ledger = Self::ledger_path(&config);
        println!("  Ledger:   {} {}", mark(&ledger), ledger.display());

        let models = Self::models_cache_path(&config);
        println!("  Models:   {} {}", mark(&models), models.display());

        let prompts = Self::custom_prompts_path(&config);
        println!("  Prompts:  {} {}", mark(&prompts), prompts.display());
    }

    /// Render the effective configuration
    pub fn render_config(config: &Config, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(config)?),
            "yaml" => serde_yaml::to_string(config).map_err(|e| StudioError::Config(e.to_string())),
            _ => toml::to_string_pretty(config).map_err(|e| StudioError::Config(e.to_string())),
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            StudioError::Config("Cannot determine global config directory".to_string())
        })?;

        fs::create_dir_all(&global_dir)?;

        if let Some(cache_dir) = Self::global_cache_dir() {
            fs::create_dir_all(&cache_dir)?;
        }
        if let Some(data_dir) = Self::global_data_dir() {
            fs::create_dir_all(&data_dir)?;
        }

        let config_path = global_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_global_config())?;
            info!("Created global config: {}", config_path.display());
        } else {
            info!("Global config exists: {}", config_path.display());
        }

        Ok(global_dir)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let project_dir = Self::project_dir();
        fs::create_dir_all(&project_dir)?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_project_config())?;
            info!("Created project config: {}", config_path.display());
        }

        Ok(project_dir)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_global_config() -> String {
        r#"# contextstudio Global Configuration
# User-wide defaults. Project settings in .contextstudio/config.toml override these.

version = "1.0"

[llm]
provider = "gemini"
model = "gemini-1.5-flash"
timeout_secs = 300
# api_key = "..."   # or set GEMINI_API_KEY

[pricing]
currency = "EUR"

[generation]
max_attempts = 3
base_delay_secs = 2
workers = 2
"#
        .to_string()
    }

    fn default_project_config() -> String {
        r#"# contextstudio Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[scan]
max_depth = 20
max_file_size = 1000000

[estimation]
output_multiplier = 1.5

[ledger]
max_entries = 1000
"#
        .to_string()
    }
}

fn mark(path: &Path) -> &'static str {
    if path.exists() { "✓" } else { "✗" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_project_config_merges_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(
                ".contextstudio/config.toml",
                "[scan]\nmax_depth = 5\n\n[pricing]\ncurrency = \"USD\"\n",
            )?;

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.scan.max_depth, 5);
            assert_eq!(config.pricing.currency, crate::pricing::Currency::Usd);
            assert_eq!(config.generation.max_attempts, 3);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_project_config_rejected() {
        Jail::expect_with(|jail| {
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(".contextstudio/config.toml", "[generation]\nworkers = 8\n")?;

            assert!(ConfigLoader::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_project_config_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_dir(PROJECT_DIR)?;
            jail.create_file(
                ".contextstudio/config.toml",
                "[llm]\nmodel = \"gemini-1.5-pro\"\n\n[ledger]\nmax_entries = 10\n",
            )?;
            jail.set_env("CONTEXTSTUDIO_LLM__MODEL", "gemini-2.0-flash");

            let config = ConfigLoader::load().map_err(|e| e.to_string())?;
            assert_eq!(config.llm.model, "gemini-2.0-flash");
            assert_eq!(config.ledger.max_entries, 10);
            Ok(())
        });
    }

    #[test]
    fn test_render_config_formats() {
        let config = Config::default();
        let toml = ConfigLoader::render_config(&config, "text").unwrap();
        assert!(toml.contains("[scan]"));

        let json = ConfigLoader::render_config(&config, "json").unwrap();
        assert!(json.contains("\"max_attempts\": 3"));

        let yaml = ConfigLoader::render_config(&config, "yaml").unwrap();
        assert!(yaml.contains("max_attempts: 3"));
    }

    #[test]
    fn test_explicit_paths_win() {
        let mut config = Config::default();
        config.ledger.path = Some(PathBuf::from("/tmp/ledger.json"));
        assert_eq!(
            ConfigLoader::ledger_path(&config),
            PathBuf::from("/tmp/ledger.json")
        );
    }
}
