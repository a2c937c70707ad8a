//! Static model price registry
//!
//! Prices are USD per million tokens. The table is read-only; lookups never
//! fail and fall back to the default model.

use serde::Serialize;
use tracing::warn;

use crate::constants::pricing::{DEFAULT_MODEL, MODEL_PREFIX, TOKENS_PER_UNIT};

/// Pricing and capacity of one model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEntry {
    pub model_id: &'static str,
    pub display_name: &'static str,
    pub input_per_million: f64,
    pub output_per_million: f64,
    pub context_window: u64,
    pub active: bool,
}

impl PriceEntry {
    pub fn input_per_token(&self) -> f64 {
        self.input_per_million / TOKENS_PER_UNIT
    }

    pub fn output_per_token(&self) -> f64 {
        self.output_per_million / TOKENS_PER_UNIT
    }
}

const fn entry(
    model_id: &'static str,
    display_name: &'static str,
    input_per_million: f64,
    output_per_million: f64,
    context_window: u64,
) -> PriceEntry {
    PriceEntry {
        model_id,
        display_name,
        input_per_million,
        output_per_million,
        context_window,
        active: true,
    }
}

/// Registry order matters for substring matching
pub static REGISTRY: &[PriceEntry] = &[
    entry("gemini-2.0-flash", "Gemini 2.0 Flash", 0.075, 0.30, 1_048_576),
    entry("gemini-2.0-flash-exp", "Gemini 2.0 Flash Exp", 0.0, 0.0, 1_048_576),
    entry("gemini-1.5-flash", "Gemini 1.5 Flash", 0.075, 0.30, 1_048_576),
    entry("gemini-1.5-flash-8b", "Gemini 1.5 Flash-8B", 0.0375, 0.15, 1_048_576),
    entry("gemini-1.5-pro", "Gemini 1.5 Pro", 3.50, 10.50, 2_097_152),
    entry(
        "gemini-2.5-flash-preview-05-20",
        "Gemini 2.5 Flash Preview",
        0.15,
        0.60,
        1_048_576,
    ),
    entry("gemini-1.0-pro", "Gemini 1.0 Pro", 0.50, 1.50, 32_768),
];

fn default_entry() -> &'static PriceEntry {
    REGISTRY
        .iter()
        .find(|e| e.model_id == DEFAULT_MODEL)
        .unwrap_or(&REGISTRY[0])
}

/// Resolve a model id to its price entry.
///
/// Strips the `models/` prefix and lowercases, then tries an exact match
/// followed by substring containment in either direction.
pub fn price_for(model: &str) -> &'static PriceEntry {
    let clean = model.replace(MODEL_PREFIX, "").to_lowercase();

    if let Some(found) = REGISTRY.iter().find(|e| e.model_id == clean) {
        return found;
    }

    if !clean.is_empty()
        && let Some(found) = REGISTRY
            .iter()
            .find(|e| clean.contains(e.model_id) || e.model_id.contains(clean.as_str()))
    {
        return found;
    }

    warn!(model = %model, fallback = DEFAULT_MODEL, "Unknown model, using default pricing");
    default_entry()
}

/// All models currently offered
pub fn active_models() -> impl Iterator<Item = &'static PriceEntry> {
    REGISTRY.iter().filter(|e| e.active)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_prefixed_lookup() {
        assert_eq!(price_for("gemini-1.5-pro").model_id, "gemini-1.5-pro");
        assert_eq!(price_for("models/Gemini-1.5-Pro").model_id, "gemini-1.5-pro");
    }

    #[test]
    fn test_substring_lookup_uses_registry_order() {
        // "gemini-2.0-flash" is listed before "-exp" and contained in the query
        assert_eq!(
            price_for("gemini-2.0-flash-001").model_id,
            "gemini-2.0-flash"
        );
        assert_eq!(price_for("1.5-flash-8").model_id, "gemini-1.5-flash-8b");
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        assert_eq!(price_for("gpt-4o").model_id, DEFAULT_MODEL);
        assert_eq!(price_for("").model_id, DEFAULT_MODEL);
    }

    #[test]
    fn test_per_token_prices() {
        let pro = price_for("gemini-1.5-pro");
        assert!((pro.input_per_token() - 3.5e-6).abs() < 1e-15);
        assert_eq!(active_models().count(), REGISTRY.len());
    }
}
