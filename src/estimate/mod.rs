//! Token estimation
//!
//! - [`classify`]: heuristic content family detection
//! - [`estimate_tokens`]: family-aware character ratio estimate
//! - [`context_usage`]: context window occupancy for a model

mod classifier;
mod tokens;

pub use classifier::{ContentFamily, classify};
pub(crate) use classifier::char_prefix;
pub use tokens::{
    ContextUsage, context_usage, estimate_output_tokens, estimate_tokens, format_token_count,
};
