//! Existing documentation detection

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::encoding::decode_text;
use crate::constants::artifacts::{
    COMMON_DOC_FILES, DOC_FOLDERS, PLACEHOLDER_MARKERS, STALE_MIN_CHARS,
};
use crate::types::{DocumentKind, ExistingArtifact, ScanInventory};

/// Heuristic: empty, very short, or carrying a placeholder marker
pub fn is_stale(content: &str) -> bool {
    if content.is_empty() || content.chars().count() < STALE_MIN_CHARS {
        return true;
    }
    let lowered = content.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Finds markdown documents already present in a project
pub struct ExistingArtifactDetector {
    doc_folders: Vec<String>,
    known_names: Vec<String>,
}

impl Default for ExistingArtifactDetector {
    fn default() -> Self {
        let known_names = DocumentKind::ALL
            .iter()
            .map(|k| k.file_name().to_string())
            .chain(COMMON_DOC_FILES.iter().map(|s| s.to_string()))
            .collect();
        Self {
            doc_folders: DOC_FOLDERS.iter().map(|s| s.to_string()).collect(),
            known_names,
        }
    }
}

impl ExistingArtifactDetector {
    fn is_known(&self, name: &str) -> bool {
        self.known_names.iter().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Replace `inventory.existing` with the artifacts found under its root
    pub fn detect(&self, inventory: &mut ScanInventory) {
        let root = inventory.root.clone();
        let mut found = HashMap::new();

        self.scan_folder(&root, &root, true, &mut found);
        for folder in &self.doc_folders {
            let path = root.join(folder);
            if path.is_dir() {
                self.scan_folder(&path, &root, false, &mut found);
            }
        }

        info!(
            root = %root.display(),
            count = found.len(),
            stale = found.values().filter(|a: &&ExistingArtifact| a.stale).count(),
            "Detected existing documentation"
        );
        inventory.existing = found;
    }

    fn scan_folder(
        &self,
        dir: &Path,
        root: &Path,
        known_only: bool,
        found: &mut HashMap<String, ExistingArtifact>,
    ) {
        let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
            Ok(iter) => iter.filter_map(|e| e.ok()).collect(),
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Cannot list documentation folder");
                return;
            }
        };
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_lowercase().ends_with(".md") {
                continue;
            }
            if known_only && !self.is_known(&name) {
                continue;
            }

            let path = entry.path();
            let content = fs::read(&path)
                .ok()
                .map(|bytes| decode_text(&bytes).0)
                .unwrap_or_default();
            let stale = is_stale(&content);
            let relative_path = path
                .strip_prefix(root)
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_else(|_| name.clone());

            debug!(file = %relative_path, stale, "Found existing document");
            found.insert(
                name.clone(),
                ExistingArtifact {
                    path,
                    relative_path,
                    file_name: name,
                    content,
                    stale,
                },
            );
        }
    }
}

/// Artifact that a generation of `kind` would replace
pub fn artifact_for(inventory: &ScanInventory, kind: DocumentKind) -> Option<&ExistingArtifact> {
    inventory.artifact(kind.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn long_text() -> String {
        "This document describes the system in detail. ".repeat(10)
    }

    #[test]
    fn test_stale_rules() {
        assert!(is_stale(""));
        assert!(is_stale("short"));
        assert!(!is_stale(&long_text()));

        let mut with_marker = long_text();
        with_marker.push_str("Deployment: Coming Soon");
        assert!(is_stale(&with_marker));

        let mut italian = long_text();
        italian.push_str("[Da completare]");
        assert!(is_stale(&italian));
    }

    #[test]
    fn test_detect_root_known_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.md"), long_text()).unwrap();
        fs::write(dir.path().join("AI_RULES.md"), "tbd").unwrap();
        fs::write(dir.path().join("notes.md"), long_text()).unwrap();
        fs::write(dir.path().join("README.txt"), long_text()).unwrap();

        let mut inv = ScanInventory::new(dir.path());
        ExistingArtifactDetector::default().detect(&mut inv);

        assert_eq!(inv.existing.len(), 2);
        assert!(!inv.existing["readme.md"].stale);
        assert!(inv.existing["AI_RULES.md"].stale);
        assert!(artifact_for(&inv, DocumentKind::Rules).is_some());
        assert!(artifact_for(&inv, DocumentKind::Security).is_none());
    }

    #[test]
    fn test_doc_folders_take_every_markdown() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::create_dir_all(dir.path().join("wiki")).unwrap();
        fs::write(dir.path().join("docs/notes.md"), long_text()).unwrap();
        fs::write(dir.path().join("wiki/Notes.MD"), "x").unwrap();
        fs::write(dir.path().join("docs/image.png"), "x").unwrap();

        let mut inv = ScanInventory::new(dir.path());
        ExistingArtifactDetector::default().detect(&mut inv);

        assert_eq!(inv.existing.len(), 2);
        assert_eq!(inv.existing["notes.md"].relative_path, "docs/notes.md");
        assert!(inv.existing["Notes.MD"].stale);
    }

    #[test]
    fn test_later_folder_overwrites_and_rerun_replaces() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("README.md"), long_text()).unwrap();
        fs::write(dir.path().join("docs/README.md"), "wip").unwrap();

        let detector = ExistingArtifactDetector::default();
        let mut inv = ScanInventory::new(dir.path());
        detector.detect(&mut inv);
        assert_eq!(inv.existing["README.md"].relative_path, "docs/README.md");

        fs::remove_file(dir.path().join("docs/README.md")).unwrap();
        fs::remove_file(dir.path().join("README.md")).unwrap();
        detector.detect(&mut inv);
        assert!(inv.existing.is_empty());
    }
}
