//! Prompt Builder System
//!
//! Assembles the generation prompt for one document kind:
//!
//! 1. **System prompt**: role and ground rules (overridable)
//! 2. **Project context**: smart preset, when given
//! 3. **Existing documentation**: replace or update instructions plus a preview
//! 4. **Specific instructions**: per-kind template (overridable)
//! 5. **Source code**: the concatenated scan contents

mod preset;
mod templates;

pub use preset::{DEFAULT_AUDIENCE, FocusArea, ProjectType, SmartPreset};
pub use templates::{SYSTEM_PROMPT, default_instructions};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::generation::EXISTING_PREVIEW_CHARS;
use crate::estimate::char_prefix;
use crate::storage::{read_json, write_json_atomic};
use crate::types::{DocumentKind, ExistingArtifact, Result};

// =============================================================================
// Custom Prompts
// =============================================================================

/// User overrides persisted as `{"prompts": {KIND: text}, "system_prompt": ...}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPrompts {
    prompts: BTreeMap<String, String>,
    system_prompt: Option<String>,
}

impl CustomPrompts {
    /// Load overrides; a missing or malformed file means no overrides
    pub fn load(path: &Path) -> Self {
        let loaded: Self = read_json(path).unwrap_or_default();
        if !loaded.prompts.is_empty() || loaded.system_prompt.is_some() {
            info!(
                prompts = loaded.prompts.len(),
                system = loaded.system_prompt.is_some(),
                "Loaded custom prompts"
            );
        }
        loaded
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(SYSTEM_PROMPT)
    }

    /// Instruction block for `kind`, custom when overridden
    pub fn instructions(&self, kind: DocumentKind) -> String {
        self.prompts
            .get(kind.key())
            .cloned()
            .unwrap_or_else(|| default_instructions(kind))
    }

    pub fn is_customized(&self, kind: DocumentKind) -> bool {
        self.prompts.contains_key(kind.key())
    }

    pub fn is_system_customized(&self) -> bool {
        self.system_prompt.is_some()
    }

    /// Override `kind`; blank text removes the override
    pub fn set_prompt(&mut self, kind: DocumentKind, text: &str) {
        if text.trim().is_empty() {
            self.prompts.remove(kind.key());
        } else {
            self.prompts.insert(kind.key().to_string(), text.to_string());
        }
    }

    pub fn set_system_prompt(&mut self, text: &str) {
        self.system_prompt = (!text.trim().is_empty()).then(|| text.to_string());
    }

    pub fn reset(&mut self, kind: DocumentKind) {
        self.prompts.remove(kind.key());
    }

    pub fn reset_all(&mut self) {
        self.prompts.clear();
        self.system_prompt = None;
    }
}

// =============================================================================
// Prompt Builder
// =============================================================================

/// Prompt section: optional `=== HEADER ===` line followed by content
#[derive(Debug, Clone)]
struct PromptSection {
    header: Option<&'static str>,
    content: String,
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    custom: CustomPrompts,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom(custom: CustomPrompts) -> Self {
        Self { custom }
    }

    pub fn custom(&self) -> &CustomPrompts {
        &self.custom
    }

    /// Build the complete prompt for `kind`
    pub fn build(
        &self,
        kind: DocumentKind,
        source: &str,
        preset: Option<&SmartPreset>,
        existing: Option<&ExistingArtifact>,
    ) -> String {
        let mut sections = vec![PromptSection {
            header: None,
            content: self.custom.system_prompt().to_string(),
        }];

        if let Some(preset) = preset {
            sections.push(PromptSection {
                header: Some("PROJECT CONTEXT"),
                content: preset.to_prompt_context(),
            });
        }

        if let Some(existing) = existing {
            sections.push(PromptSection {
                header: Some("EXISTING DOCUMENTATION"),
                content: existing_context(existing),
            });
        }

        sections.push(PromptSection {
            header: Some("SPECIFIC INSTRUCTIONS"),
            content: self.custom.instructions(kind),
        });

        sections.push(PromptSection {
            header: Some("SOURCE CODE"),
            content: source.to_string(),
        });

        let prompt = render(sections);
        debug!(
            kind = kind.key(),
            chars = prompt.len(),
            existing = existing.map(|e| e.file_name.as_str()).unwrap_or("none"),
            "Built prompt"
        );
        prompt
    }
}

fn render(sections: Vec<PromptSection>) -> String {
    let mut parts = Vec::with_capacity(sections.len() * 2);
    for section in sections {
        if let Some(header) = section.header {
            parts.push(format!("\n=== {} ===", header));
        }
        parts.push(section.content);
    }
    parts.join("\n")
}

fn existing_context(existing: &ExistingArtifact) -> String {
    let mut parts = Vec::new();

    if existing.stale {
        parts.push(format!(
            "NOTE: '{}' already exists but looks OUTDATED or incomplete.\n\
             Your task is to REPLACE it completely with an up-to-date, complete version.\n\
             Keep the overall structure if it is sound, but refresh all content.\n",
            existing.file_name
        ));
    } else {
        parts.push(format!(
            "NOTE: '{}' already exists.\n\
             Your task is to UPDATE this existing documentation:\n\
             - Keep valid sections and refresh them where needed\n\
             - Add sections for missing functionality\n\
             - Remove references to obsolete code\n\
             - Improve quality where possible\n",
            existing.file_name
        ));
    }

    if !existing.content.is_empty() {
        let preview = char_prefix(&existing.content, EXISTING_PREVIEW_CHARS);
        let mut preview = preview.to_string();
        if preview.len() < existing.content.len() {
            preview.push_str("\n... [content truncated] ...");
        }
        parts.push("\n--- CURRENT CONTENT ---\n".to_string());
        parts.push(preview);
        parts.push("\n--- END CURRENT CONTENT ---\n".to_string());
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn artifact(content: &str, stale: bool) -> ExistingArtifact {
        ExistingArtifact {
            path: PathBuf::from("/p/docs/AI_RULES.md"),
            relative_path: "docs/AI_RULES.md".into(),
            file_name: "AI_RULES.md".into(),
            content: content.into(),
            stale,
        }
    }

    #[test]
    fn test_sections_in_order() {
        let preset = SmartPreset::new(ProjectType::WebBackend);
        let prompt = PromptBuilder::new().build(
            DocumentKind::Rules,
            "=== FILE: main.py ===\nprint(1)",
            Some(&preset),
            Some(&artifact("# Rules", false)),
        );

        let system = prompt.find("senior software architect").unwrap();
        let context = prompt.find("=== PROJECT CONTEXT ===").unwrap();
        let existing = prompt.find("=== EXISTING DOCUMENTATION ===").unwrap();
        let instructions = prompt.find("=== SPECIFIC INSTRUCTIONS ===").unwrap();
        let source = prompt.find("=== SOURCE CODE ===").unwrap();
        assert!(system < context && context < existing);
        assert!(existing < instructions && instructions < source);
        assert!(prompt.ends_with("=== FILE: main.py ===\nprint(1)"));
        assert!(prompt.contains("## GENERATE: AI_RULES.md"));
    }

    #[test]
    fn test_optional_sections_omitted() {
        let prompt = PromptBuilder::new().build(DocumentKind::Context, "code", None, None);
        assert!(!prompt.contains("=== PROJECT CONTEXT ==="));
        assert!(!prompt.contains("=== EXISTING DOCUMENTATION ==="));
        assert!(prompt.contains("\n\n=== SPECIFIC INSTRUCTIONS ===\n"));
    }

    #[test]
    fn test_stale_artifact_is_replaced() {
        let prompt = PromptBuilder::new().build(
            DocumentKind::Rules,
            "",
            None,
            Some(&artifact("TODO: write", true)),
        );
        assert!(prompt.contains("REPLACE it completely"));
        assert!(prompt.contains("--- CURRENT CONTENT ---\n\nTODO: write"));
        assert!(!prompt.contains("[content truncated]"));
    }

    #[test]
    fn test_preview_truncated() {
        let long = "é".repeat(EXISTING_PREVIEW_CHARS + 10);
        let prompt =
            PromptBuilder::new().build(DocumentKind::Rules, "", None, Some(&artifact(&long, false)));
        assert!(prompt.contains("UPDATE this existing documentation"));
        assert!(prompt.contains("... [content truncated] ..."));
        assert!(!prompt.contains(&long));
    }

    #[test]
    fn test_custom_overrides() {
        let mut custom = CustomPrompts::default();
        custom.set_system_prompt("You write terse docs.");
        custom.set_prompt(DocumentKind::Testing, "List the test commands.");

        let builder = PromptBuilder::with_custom(custom);
        let prompt = builder.build(DocumentKind::Testing, "src", None, None);
        assert!(prompt.starts_with("You write terse docs."));
        assert!(prompt.contains("List the test commands."));
        assert!(!prompt.contains("## GENERATE"));

        let other = builder.build(DocumentKind::Security, "src", None, None);
        assert!(other.contains("## GENERATE: SECURITY_AUDIT.md"));
    }

    #[test]
    fn test_blank_override_removes() {
        let mut custom = CustomPrompts::default();
        custom.set_prompt(DocumentKind::Rules, "x");
        assert!(custom.is_customized(DocumentKind::Rules));
        custom.set_prompt(DocumentKind::Rules, "  ");
        assert!(!custom.is_customized(DocumentKind::Rules));

        custom.set_system_prompt("");
        assert!(!custom.is_system_customized());
        assert_eq!(custom.system_prompt(), SYSTEM_PROMPT);
    }

    #[test]
    fn test_custom_prompts_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom_prompts.json");
        std::fs::write(
            &path,
            r#"{"prompts": {"API_DOCS": "Only list endpoints."}, "system_prompt": null}"#,
        )
        .unwrap();

        let loaded = CustomPrompts::load(&path);
        assert_eq!(loaded.instructions(DocumentKind::ApiDocs), "Only list endpoints.");
        assert!(!loaded.is_system_customized());

        let mut changed = loaded.clone();
        changed.reset_all();
        changed.set_system_prompt("sys");
        changed.save(&path).unwrap();
        assert_eq!(CustomPrompts::load(&path), changed);
    }

    #[test]
    fn test_missing_or_malformed_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            CustomPrompts::load(&temp.path().join("absent.json")),
            CustomPrompts::default()
        );

        let bad = temp.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert_eq!(CustomPrompts::load(&bad), CustomPrompts::default());
    }
}
