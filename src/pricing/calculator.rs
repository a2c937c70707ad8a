//! Cost estimation over the price registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::currency::{Currency, ExchangeRates};
use super::registry::{PriceEntry, active_models, price_for};
use crate::config::Config;
use crate::constants::estimation::DEFAULT_OUTPUT_MULTIPLIER;
use crate::estimate::{ContentFamily, classify, estimate_output_tokens, estimate_tokens};

/// Priced token estimate for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub currency: Currency,
    pub model_id: String,
    pub model_name: String,
    pub family: ContentFamily,
    pub created_at: DateTime<Utc>,
}

impl CostEstimate {
    /// Display string for the total cost
    pub fn formatted_total(&self) -> String {
        format_cost(self.total_cost, self.currency)
    }
}

/// Format a cost with precision scaled to its magnitude
pub fn format_cost(cost: f64, currency: Currency) -> String {
    let symbol = currency.symbol();
    if cost < 0.01 {
        format!("{}{:.4}", symbol, cost)
    } else if cost < 1.0 {
        format!("{}{:.3}", symbol, cost)
    } else {
        format!("{}{:.2}", symbol, cost)
    }
}

/// Turns text or token counts into priced estimates
#[derive(Debug, Clone)]
pub struct CostCalculator {
    default_currency: Currency,
    rates: ExchangeRates,
    output_multiplier: f64,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self {
            default_currency: Currency::Eur,
            rates: ExchangeRates::default(),
            output_multiplier: DEFAULT_OUTPUT_MULTIPLIER,
        }
    }
}

impl CostCalculator {
    pub fn new(default_currency: Currency, rates: ExchangeRates, output_multiplier: f64) -> Self {
        Self {
            default_currency,
            rates,
            output_multiplier,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pricing.currency,
            ExchangeRates::with_overrides(&config.pricing.exchange_rates),
            config.estimation.output_multiplier,
        )
    }

    pub fn default_currency(&self) -> Currency {
        self.default_currency
    }

    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// Estimate the cost of sending `text` to `model`
    pub fn estimate_cost(
        &self,
        text: &str,
        model: &str,
        currency: Option<Currency>,
        family: Option<ContentFamily>,
        include_output: bool,
    ) -> CostEstimate {
        let family = family.unwrap_or_else(|| classify(text));
        let input_tokens = estimate_tokens(text, Some(family));
        self.price(
            price_for(model),
            input_tokens,
            currency,
            family,
            include_output,
        )
    }

    /// Estimate from an already-known input token count
    pub fn estimate_from_tokens(
        &self,
        input_tokens: u64,
        model: &str,
        currency: Option<Currency>,
        include_output: bool,
    ) -> CostEstimate {
        self.price(
            price_for(model),
            input_tokens,
            currency,
            ContentFamily::Mixed,
            include_output,
        )
    }

    /// Price the same input across models, cheapest first.
    ///
    /// With no explicit list, every active registry model is compared.
    pub fn compare_models(
        &self,
        input_tokens: u64,
        models: Option<&[String]>,
        currency: Option<Currency>,
    ) -> Vec<CostEstimate> {
        let mut estimates: Vec<CostEstimate> = match models {
            Some(list) if !list.is_empty() => list
                .iter()
                .map(|m| self.estimate_from_tokens(input_tokens, m, currency, true))
                .collect(),
            _ => active_models()
                .map(|entry| self.price(entry, input_tokens, currency, ContentFamily::Mixed, true))
                .collect(),
        };
        estimates.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
        estimates
    }

    /// Price measured usage (input and output token counts both known)
    pub fn usage_cost(
        &self,
        input_tokens: u64,
        output_tokens: u64,
        model: &str,
        currency: Option<Currency>,
    ) -> CostEstimate {
        self.price_tokens(
            price_for(model),
            input_tokens,
            output_tokens,
            currency,
            ContentFamily::Mixed,
        )
    }

    fn price(
        &self,
        entry: &PriceEntry,
        input_tokens: u64,
        currency: Option<Currency>,
        family: ContentFamily,
        include_output: bool,
    ) -> CostEstimate {
        let output_tokens = if include_output {
            estimate_output_tokens(input_tokens, self.output_multiplier)
        } else {
            0
        };
        self.price_tokens(entry, input_tokens, output_tokens, currency, family)
    }

    fn price_tokens(
        &self,
        entry: &PriceEntry,
        input_tokens: u64,
        output_tokens: u64,
        currency: Option<Currency>,
        family: ContentFamily,
    ) -> CostEstimate {
        let currency = currency.unwrap_or(self.default_currency);
        let rate = self.rates.rate(currency);
        let input_cost = input_tokens as f64 * entry.input_per_token() * rate;
        let output_cost = output_tokens as f64 * entry.output_per_token() * rate;

        CostEstimate {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            currency,
            model_id: entry.model_id.to_string(),
            model_name: entry.display_name.to_string(),
            family,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_estimate_from_tokens_usd() {
        let calc = CostCalculator::default();
        let est = calc.estimate_from_tokens(1_000_000, "gemini-1.5-pro", Some(Currency::Usd), true);
        assert_eq!(est.output_tokens, 1_500_000);
        assert!((est.input_cost - 3.5).abs() < 1e-9);
        assert!((est.output_cost - 15.75).abs() < 1e-9);
        assert_eq!(est.family, ContentFamily::Mixed);
        assert_eq!(est.model_name, "Gemini 1.5 Pro");
    }

    #[test]
    fn test_currency_conversion_and_default() {
        let calc = CostCalculator::default();
        let est = calc.estimate_from_tokens(1_000_000, "gemini-1.5-pro", None, false);
        assert_eq!(est.currency, Currency::Eur);
        assert_eq!(est.output_tokens, 0);
        assert!((est.total_cost - 3.5 * 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_cost_classifies_text() {
        let calc = CostCalculator::default();
        let est = calc.estimate_cost(r#"{"k": 1}"#, "gemini-1.5-flash", None, None, true);
        assert_eq!(est.family, ContentFamily::Json);
        assert_eq!(est.input_tokens, 2);
    }

    #[test]
    fn test_unknown_model_uses_default_pricing() {
        let calc = CostCalculator::default();
        let est = calc.estimate_from_tokens(10, "mystery-model", None, true);
        assert_eq!(est.model_id, "gemini-1.5-flash");
    }

    #[test]
    fn test_compare_models_sorted() {
        let calc = CostCalculator::default();
        let ranked = calc.compare_models(100_000, None, Some(Currency::Usd));
        assert_eq!(ranked.len(), 7);
        assert_eq!(ranked[0].model_id, "gemini-2.0-flash-exp");
        assert_eq!(ranked.last().map(|e| e.model_id.as_str()), Some("gemini-1.5-pro"));
        assert!(ranked.windows(2).all(|w| w[0].total_cost <= w[1].total_cost));

        let subset = vec!["gemini-1.5-pro".to_string(), "gemini-1.5-flash-8b".to_string()];
        let ranked = calc.compare_models(100_000, Some(&subset), None);
        assert_eq!(ranked[0].model_id, "gemini-1.5-flash-8b");
    }

    #[test]
    fn test_usage_cost() {
        let calc = CostCalculator::default();
        let est = calc.usage_cost(1_000_000, 2_000_000, "gemini-1.5-flash", Some(Currency::Usd));
        assert_eq!(est.total_tokens, 3_000_000);
        assert!((est.input_cost - 0.075).abs() < 1e-9);
        assert!((est.output_cost - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_format_cost_precision() {
        assert_eq!(format_cost(0.001234, Currency::Usd), "$0.0012");
        assert_eq!(format_cost(0.1234, Currency::Eur), "€0.123");
        assert_eq!(format_cost(12.5, Currency::Gbp), "£12.50");
    }

    proptest! {
        #[test]
        fn prop_total_is_sum(tokens in 0u64..50_000_000, idx in 0usize..7) {
            let calc = CostCalculator::default();
            let model = crate::pricing::REGISTRY[idx].model_id;
            let est = calc.estimate_from_tokens(tokens, model, Some(Currency::Jpy), true);
            prop_assert!(est.input_cost >= 0.0);
            prop_assert!(est.output_cost >= 0.0);
            prop_assert_eq!(est.total_cost, est.input_cost + est.output_cost);
            prop_assert_eq!(est.total_tokens, est.input_tokens + est.output_tokens);
        }
    }
}
