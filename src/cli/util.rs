//! CLI Common Utilities
//!
//! Shared context loading and the blocking scan pipeline used by several
//! commands.

use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader, PROJECT_DIR};
use crate::ledger::CostHistoryLedger;
use crate::pricing::{CostCalculator, Currency};
use crate::scanner::{DirectoryScanner, ExistingArtifactDetector, ScanPolicy};
use crate::types::{CancelToken, ProgressFn, Result, ScanInventory, StudioError};

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Working directory at startup
    pub cwd: PathBuf,
}

impl CommandContext {
    /// Load configuration from every layer
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        let cwd = std::env::current_dir()?;
        Ok(Self { config, cwd })
    }

    /// Resolve an optional path argument against the working directory
    pub fn resolve_root(&self, path: Option<PathBuf>) -> PathBuf {
        match path {
            Some(p) if p.is_absolute() => p,
            Some(p) => self.cwd.join(p),
            None => self.cwd.clone(),
        }
    }

    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy::from_config(&self.config.scan)
    }

    pub fn calculator(&self) -> CostCalculator {
        CostCalculator::from_config(&self.config)
    }

    pub fn ledger(&self) -> CostHistoryLedger {
        CostHistoryLedger::open_with_capacity(
            ConfigLoader::ledger_path(&self.config),
            self.config.ledger.max_entries,
        )
    }

    /// Requested model, else the configured one
    pub fn model(&self, requested: Option<String>) -> String {
        requested.unwrap_or_else(|| self.config.llm.model.clone())
    }

    /// Requested currency, else the configured one
    pub fn currency(&self, requested: Option<&str>) -> Result<Currency> {
        match requested {
            Some(code) => code.parse().map_err(StudioError::Config),
            None => Ok(self.config.pricing.currency),
        }
    }
}

/// What to do after the tree walk
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Relative paths to exclude after the walk
    pub exclude: Vec<String>,
    /// Load file contents
    pub read_contents: bool,
    /// Detect existing documentation
    pub detect_artifacts: bool,
}

/// Scan `root` on the blocking pool
pub async fn scan_project(
    root: &Path,
    policy: ScanPolicy,
    request: ScanRequest,
    progress: ProgressFn,
    cancel: CancelToken,
) -> Result<ScanInventory> {
    let root = root.to_path_buf();
    let handle = tokio::task::spawn_blocking(move || {
        let token_factor = policy.token_factor;
        let scanner = DirectoryScanner::new(policy);
        let mut inventory = scanner.scan(&root, &progress, &cancel);

        for rel in &request.exclude {
            let rel = rel.trim_start_matches("./").replace('\\', "/");
            if !inventory.set_included(&rel, false, token_factor) {
                tracing::warn!(path = %rel, "Excluded path not in inventory");
            }
        }

        if request.detect_artifacts {
            ExistingArtifactDetector::default().detect(&mut inventory);
        }
        if request.read_contents && !inventory.cancelled {
            scanner.read_contents(&mut inventory, &progress, &cancel);
        }
        inventory
    });

    handle
        .await
        .map_err(|e| StudioError::Io(std::io::Error::other(e.to_string())))
}

/// Require `init` to have been run in the working directory
pub fn require_initialized() -> Result<PathBuf> {
    let dir = Path::new(PROJECT_DIR);
    if !dir.exists() {
        return Err(StudioError::NotInitialized);
    }
    Ok(dir.to_path_buf())
}

pub fn is_initialized() -> bool {
    Path::new(PROJECT_DIR).exists()
}
