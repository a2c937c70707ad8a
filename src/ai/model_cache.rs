//! Model catalog cache
//!
//! Persists the provider's model list as `{"timestamp": ..., "models": [...]}`
//! and serves it while younger than the validity window.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::provider::TextGenerator;
use crate::config::CacheConfig;
use crate::constants::cache::{MODEL_PRIORITY, MODELS_CACHE_HOURS};
use crate::storage::{read_json, write_json_atomic};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedModels {
    timestamp: DateTime<Utc>,
    models: Vec<String>,
}

pub struct ModelCatalogCache {
    path: PathBuf,
    cache_hours: i64,
}

impl ModelCatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache_hours: MODELS_CACHE_HOURS,
        }
    }

    pub fn from_config(path: impl Into<PathBuf>, config: &CacheConfig) -> Self {
        Self::new(path).with_cache_hours(config.cache_hours)
    }

    pub fn with_cache_hours(mut self, hours: i64) -> Self {
        self.cache_hours = hours;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached models when the cache is younger than the validity window
    pub fn cached(&self) -> Option<Vec<String>> {
        let cached = read_json::<CachedModels>(&self.path)?;
        let age = Utc::now().signed_duration_since(cached.timestamp);
        let fresh = match TimeDelta::try_hours(self.cache_hours) {
            Some(window) => age < window,
            None => self.cache_hours > 0,
        };
        if fresh {
            Some(cached.models)
        } else {
            debug!(age_hours = age.num_hours(), "Model cache expired");
            None
        }
    }

    /// Cached models regardless of age
    fn stale(&self) -> Option<Vec<String>> {
        read_json::<CachedModels>(&self.path).map(|c| c.models)
    }

    /// Model ids, from the cache when fresh, otherwise from the provider.
    ///
    /// A failed fetch falls back to the cache even when expired, then to an
    /// empty list.
    pub async fn get_models(&self, provider: &dyn TextGenerator, force_refresh: bool) -> Vec<String> {
        if !force_refresh && let Some(models) = self.cached() {
            debug!(count = models.len(), "Using cached model list");
            return models;
        }

        match provider.list_models().await {
            Ok(mut models) => {
                sort_by_priority(&mut models);
                let entry = CachedModels {
                    timestamp: Utc::now(),
                    models: models.clone(),
                };
                if let Err(e) = write_json_atomic(&self.path, &entry) {
                    warn!(path = %self.path.display(), error = %e, "Failed to save model cache");
                }
                info!(count = models.len(), provider = provider.name(), "Fetched model list");
                models
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch models, using cache");
                self.stale().unwrap_or_default()
            }
        }
    }
}

fn priority(model: &str) -> usize {
    MODEL_PRIORITY
        .iter()
        .position(|p| model.contains(p))
        .unwrap_or(MODEL_PRIORITY.len())
}

/// Newest families first, then by name
pub fn sort_by_priority(models: &mut [String]) {
    models.sort_by(|a, b| priority(a).cmp(&priority(b)).then_with(|| a.cmp(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::GenerationParams;
    use crate::types::{Result, StudioError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    struct StaticCatalog {
        models: Option<Vec<String>>,
        calls: AtomicU32,
    }

    impl StaticCatalog {
        fn ok(models: &[&str]) -> Self {
            Self {
                models: Some(models.iter().map(|s| s.to_string()).collect()),
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                models: None,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StaticCatalog {
        async fn generate(&self, _: &str, _: &str, _: &GenerationParams) -> Result<String> {
            Ok(String::new())
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models
                .clone()
                .ok_or_else(|| StudioError::LlmApi("connection refused".into()))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    #[test]
    fn test_sort_by_priority() {
        let mut models: Vec<String> = [
            "models/gemini-1.0-pro",
            "models/gemini-1.5-flash",
            "models/gemini-2.0-flash",
            "models/gemini-1.5-pro",
            "models/gemini-2.5-pro",
            "models/gemini-2.0-flash-exp",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        sort_by_priority(&mut models);
        assert_eq!(
            models,
            vec![
                "models/gemini-2.5-pro",
                "models/gemini-2.0-flash",
                "models/gemini-2.0-flash-exp",
                "models/gemini-1.5-pro",
                "models/gemini-1.5-flash",
                "models/gemini-1.0-pro",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_then_serve_from_cache() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCatalogCache::new(temp.path().join("models.json"));
        let provider = StaticCatalog::ok(&["models/gemini-1.5-flash", "models/gemini-2.0-flash"]);

        let first = cache.get_models(&provider, false).await;
        assert_eq!(first[0], "models/gemini-2.0-flash");
        let second = cache.get_models(&provider, false).await;
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        cache.get_models(&provider, true).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models.json");
        let old = CachedModels {
            timestamp: Utc::now() - TimeDelta::hours(25),
            models: vec!["models/old".into()],
        };
        write_json_atomic(&path, &old).unwrap();

        let cache = ModelCatalogCache::new(&path);
        assert!(cache.cached().is_none());

        let provider = StaticCatalog::ok(&["models/gemini-2.0-flash"]);
        assert_eq!(
            cache.get_models(&provider, false).await,
            vec!["models/gemini-2.0-flash"]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_stale_cache() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models.json");
        let old = CachedModels {
            timestamp: Utc::now() - TimeDelta::hours(48),
            models: vec!["models/gemini-1.5-pro".into()],
        };
        write_json_atomic(&path, &old).unwrap();

        let cache = ModelCatalogCache::new(&path);
        let models = cache.get_models(&StaticCatalog::failing(), false).await;
        assert_eq!(models, vec!["models/gemini-1.5-pro"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_without_cache_is_empty() {
        let temp = TempDir::new().unwrap();
        let cache = ModelCatalogCache::new(temp.path().join("missing.json"));
        assert!(cache.get_models(&StaticCatalog::failing(), true).await.is_empty());
    }

    #[test]
    fn test_huge_cache_window_keeps_entries_fresh() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models.json");
        let old = CachedModels {
            timestamp: Utc::now() - TimeDelta::hours(48),
            models: vec!["models/gemini-1.5-pro".into()],
        };
        write_json_atomic(&path, &old).unwrap();

        let cache = ModelCatalogCache::new(&path).with_cache_hours(i64::MAX);
        assert_eq!(cache.cached(), Some(vec!["models/gemini-1.5-pro".to_string()]));
    }
}
