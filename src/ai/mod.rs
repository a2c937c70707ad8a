//! AI Integration Layer
//!
//! Text generation against a remote service: provider boundary, bounded-retry
//! orchestration, prompt assembly and the cached model catalog.

pub mod model_cache;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use model_cache::{ModelCatalogCache, sort_by_priority};
pub use orchestrator::{CANCELLED, GenerationOrchestrator, GenerationOutcome, RetryPolicy};
pub use prompt::{CustomPrompts, FocusArea, ProjectType, PromptBuilder, SmartPreset};
pub use provider::{
    GeminiProvider, GenerationParams, SharedGenerator, TextGenerator, create_provider,
};
