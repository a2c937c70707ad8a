//! Content family detection
//!
//! Heuristic classification of text into a [`ContentFamily`], used to pick a
//! characters-per-token ratio. Only the leading prefix is inspected, except
//! that JSON detection parses the full text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::constants::estimation::{
    CLASSIFY_PREFIX_CHARS, CODE_MATCH_THRESHOLD, DEFAULT_RATIO, ITALIAN_MATCH_THRESHOLD,
    MARKDOWN_MATCH_THRESHOLD,
};

/// Coarse text category driving token estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFamily {
    Code,
    ProseEn,
    ProseIt,
    #[default]
    Mixed,
    Json,
    Markdown,
}

impl ContentFamily {
    /// Characters per token
    pub fn ratio(&self) -> f64 {
        match self {
            ContentFamily::Code => 3.8,
            ContentFamily::ProseEn => 4.0,
            ContentFamily::ProseIt => 4.2,
            ContentFamily::Mixed => DEFAULT_RATIO,
            ContentFamily::Json => 3.5,
            ContentFamily::Markdown => 4.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFamily::Code => "code",
            ContentFamily::ProseEn => "prose_en",
            ContentFamily::ProseIt => "prose_it",
            ContentFamily::Mixed => "mixed",
            ContentFamily::Json => "json",
            ContentFamily::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ContentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

static CODE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"def\s+\w+\s*\(",
        r"function\s+\w+\s*\(",
        r"class\s+\w+",
        r"import\s+[\w.]+",
        r"const\s+\w+\s*=",
        r"let\s+\w+\s*=",
        r"public\s+\w+\s+\w+\s*\(",
        r"#include\s*<",
        r"fn\s+\w+\s*\(",
    ])
});

static MARKDOWN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?m)^#+\s",
        r"(?m)^\*\s",
        r"(?m)^\d+\.\s",
        r"```",
        r"\[.*\]\(.*\)",
    ])
});

const ITALIAN_STOP_WORDS: &[&str] = &[
    "che", "della", "nella", "sono", "questo", "perché", "quando", "anche",
];

static ITALIAN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ITALIAN_STOP_WORDS
        .iter()
        .filter_map(|w| Regex::new(&format!(r"\b{}\b", regex::escape(w))).ok())
        .collect()
});

/// Leading `max_chars` characters of `text`
pub(crate) fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn count_matches(patterns: &[Regex], sample: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(sample)).count()
}

/// Classify text into a content family
pub fn classify(text: &str) -> ContentFamily {
    if text.is_empty() {
        return ContentFamily::Mixed;
    }

    let sample = char_prefix(text, CLASSIFY_PREFIX_CHARS);
    let trimmed = sample.trim();

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
    {
        return ContentFamily::Json;
    }

    if count_matches(&CODE_PATTERNS, sample) >= CODE_MATCH_THRESHOLD {
        return ContentFamily::Code;
    }

    if count_matches(&MARKDOWN_PATTERNS, sample) >= MARKDOWN_MATCH_THRESHOLD {
        return ContentFamily::Markdown;
    }

    let lowered = sample.to_lowercase();
    if count_matches(&ITALIAN_PATTERNS, &lowered) >= ITALIAN_MATCH_THRESHOLD {
        return ContentFamily::ProseIt;
    }

    ContentFamily::Mixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_mixed() {
        assert_eq!(classify(""), ContentFamily::Mixed);
    }

    #[test]
    fn test_json_requires_full_parse() {
        assert_eq!(classify(r#"{"a": [1, 2, 3]}"#), ContentFamily::Json);
        assert_eq!(classify("  [1, 2]"), ContentFamily::Json);
        assert_ne!(classify(r#"{"a": "#), ContentFamily::Json);
    }

    #[test]
    fn test_code_needs_two_patterns() {
        let python = "import os\n\ndef main():\n    pass\n";
        assert_eq!(classify(python), ContentFamily::Code);

        let rust = "fn main() {\n    let x = 1;\n}\n";
        assert_eq!(classify(rust), ContentFamily::Code);

        assert_ne!(classify("class Foo is a word here"), ContentFamily::Code);
    }

    #[test]
    fn test_markdown_line_anchors() {
        let md = "# Title\n\nSome text.\n\n* item one\n* item two\n";
        assert_eq!(classify(md), ContentFamily::Markdown);

        let links = "See [docs](http://x) and\n1. first\n";
        assert_eq!(classify(links), ContentFamily::Markdown);
    }

    #[test]
    fn test_italian_prose() {
        let it = "Questo progetto è quello che serve, anche quando sono stanco.";
        assert_eq!(classify(it), ContentFamily::ProseIt);

        // Substrings do not count as whole words
        assert_eq!(classify("cheese dellar sonore"), ContentFamily::Mixed);
    }

    #[test]
    fn test_only_prefix_inspected() {
        let mut text = "a".repeat(CLASSIFY_PREFIX_CHARS);
        text.push_str("\nimport os\ndef main():\n");
        assert_eq!(classify(&text), ContentFamily::Mixed);
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("àèìòù", 2), "àè");
        assert_eq!(char_prefix("ab", 10), "ab");
    }

    #[test]
    fn test_family_serde_names() {
        assert_eq!(
            serde_json::to_string(&ContentFamily::ProseIt).unwrap(),
            "\"prose_it\""
        );
        assert_eq!(ContentFamily::Json.to_string(), "json");
    }
}
