//! contextstudio - Token-Aware AI Documentation Generator
//!
//! Turns a local source tree into a cost-bounded request to a remote
//! text-generation service and reliably retrieves the result.
//!
//! ## Pipeline
//!
//! - **Scan**: policy-driven directory walk with cancellation and progress
//! - **Estimate**: content classification and family-aware token counts
//! - **Cost**: per-model pricing with currency conversion
//! - **Generate**: bounded retries with linear backoff
//! - **Ledger**: persisted estimate/actual history with accuracy stats
//!
//! ## Quick Start
//!
//! ```ignore
//! use contextstudio::{CancelToken, CostCalculator, DirectoryScanner, ScanPolicy, silent_progress};
//!
//! let scanner = DirectoryScanner::new(ScanPolicy::default());
//! let mut inventory = scanner.scan(&root, &silent_progress(), &CancelToken::new());
//! scanner.read_contents(&mut inventory, &silent_progress(), &CancelToken::new());
//!
//! let estimate = CostCalculator::default().estimate_cost(
//!     &inventory.combined_content(),
//!     "gemini-1.5-flash",
//!     None,
//!     None,
//!     true,
//! );
//! println!("{}", estimate.formatted_total());
//! ```
//!
//! ## Modules
//!
//! - [`scanner`]: directory walk and existing documentation detection
//! - [`estimate`]: content classification and token estimation
//! - [`pricing`]: model registry, currencies and cost calculation
//! - [`ledger`]: cost history
//! - [`ai`]: provider boundary, orchestration, prompts, model cache
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod estimate;
pub mod ledger;
pub mod pricing;
pub mod scanner;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, Result, StudioError};

// Shared control types
pub use types::{CancelToken, DocumentKind, ProgressFn, ScanInventory, silent_progress};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use estimate::{ContentFamily, classify, estimate_tokens};
pub use ledger::{AccuracyStats, CostHistoryLedger, LedgerEntry};
pub use pricing::{CostCalculator, CostEstimate, Currency, PriceEntry, price_for};
pub use scanner::{DirectoryScanner, ExistingArtifactDetector, ScanPolicy};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GeminiProvider, GenerationOrchestrator, GenerationOutcome, ModelCatalogCache, PromptBuilder,
    SmartPreset, TextGenerator,
};
