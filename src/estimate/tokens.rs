//! Character-ratio token estimation

use serde::Serialize;

use super::classifier::{ContentFamily, classify};
use crate::pricing::PriceEntry;

/// Estimate input tokens for `text`.
///
/// Classifies the text when no family is supplied. Counts characters, not
/// bytes, and truncates toward zero.
pub fn estimate_tokens(text: &str, family: Option<ContentFamily>) -> u64 {
    if text.is_empty() {
        return 0;
    }
    let family = family.unwrap_or_else(|| classify(text));
    let chars = text.chars().count() as f64;
    (chars / family.ratio()).floor() as u64
}

/// Expected output tokens, rounded to the nearest integer
pub fn estimate_output_tokens(input_tokens: u64, multiplier: f64) -> u64 {
    if multiplier.is_nan() || multiplier <= 0.0 {
        return 0;
    }
    (input_tokens as f64 * multiplier).round() as u64
}

/// Human-readable token count: `1.2M`, `12,345`, or plain
pub fn format_token_count(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        group_thousands(tokens)
    } else {
        tokens.to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// How much of a model's context window a prompt would occupy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextUsage {
    pub tokens: u64,
    pub context_window: u64,
    pub percent: f64,
    pub fits: bool,
}

pub fn context_usage(tokens: u64, entry: &PriceEntry) -> ContextUsage {
    let percent = if entry.context_window == 0 {
        100.0
    } else {
        tokens as f64 / entry.context_window as f64 * 100.0
    };
    ContextUsage {
        tokens,
        context_window: entry.context_window,
        percent,
        fits: tokens <= entry.context_window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::price_for;
    use proptest::prelude::*;

    #[test]
    fn test_empty_text_is_zero() {
        assert_eq!(estimate_tokens("", None), 0);
        assert_eq!(estimate_tokens("", Some(ContentFamily::Code)), 0);
    }

    #[test]
    fn test_explicit_family_ratio() {
        let text = "x".repeat(38);
        assert_eq!(estimate_tokens(&text, Some(ContentFamily::Code)), 10);
        assert_eq!(estimate_tokens(&text, Some(ContentFamily::Json)), 10);
        assert_eq!(estimate_tokens(&text, Some(ContentFamily::ProseIt)), 9);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "è".repeat(8);
        assert_eq!(estimate_tokens(&text, Some(ContentFamily::Mixed)), 2);
    }

    #[test]
    fn test_output_tokens_round() {
        assert_eq!(estimate_output_tokens(100, 1.5), 150);
        assert_eq!(estimate_output_tokens(3, 1.5), 5);
        assert_eq!(estimate_output_tokens(100, 0.0), 0);
    }

    #[test]
    fn test_format_token_count() {
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_000), "1,000");
        assert_eq!(format_token_count(12_345), "12,345");
        assert_eq!(format_token_count(999_999), "999,999");
        assert_eq!(format_token_count(1_240_000), "1.2M");
    }

    #[test]
    fn test_context_usage() {
        let entry = price_for("gemini-1.0-pro");
        let usage = context_usage(16_384, entry);
        assert!((usage.percent - 50.0).abs() < 1e-9);
        assert!(usage.fits);
        assert!(!context_usage(40_000, entry).fits);
    }

    proptest! {
        #[test]
        fn prop_estimate_matches_classified_ratio(text in "\\PC{0,300}") {
            let expected = if text.is_empty() {
                0
            } else {
                (text.chars().count() as f64 / classify(&text).ratio()).floor() as u64
            };
            prop_assert_eq!(estimate_tokens(&text, None), expected);
        }

        #[test]
        fn prop_estimate_never_exceeds_chars(text in "\\PC{0,300}") {
            prop_assert!(estimate_tokens(&text, None) <= text.chars().count() as u64);
        }
    }
}
