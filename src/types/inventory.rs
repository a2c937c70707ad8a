//! Scan inventory types
//!
//! `ScanInventory` is produced by the directory scanner and enriched in place
//! by content reading and existing-artifact detection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A candidate file found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute (or root-joined) path
    pub path: PathBuf,
    /// Path relative to the scan root, `/`-separated
    pub relative_path: String,
    /// Size in bytes at scan time
    pub size: u64,
    /// Lowercase extension including the leading dot
    pub extension: String,
    /// Whether the file takes part in reading and cost estimation
    pub included: bool,
}

/// An already-present documentation file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingArtifact {
    pub path: PathBuf,
    pub relative_path: String,
    pub file_name: String,
    pub content: String,
    /// Heuristic: looks incomplete or placeholder-only
    pub stale: bool,
}

/// Result of scanning one project tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanInventory {
    pub root: PathBuf,
    pub files: Vec<FileRecord>,
    /// Sum of sizes of included files
    pub total_size: u64,
    /// `total_size / token_factor`
    pub estimated_tokens: u64,
    /// Relative path -> decoded text, only for included files
    pub contents: HashMap<String, String>,
    /// File name -> detected artifact
    pub existing: HashMap<String, ExistingArtifact>,
    /// Traversal stopped early on request
    pub cancelled: bool,
}

impl ScanInventory {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Iterate over files currently marked as included
    pub fn included(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|f| f.included)
    }

    pub fn included_count(&self) -> usize {
        self.included().count()
    }

    /// Toggle inclusion of a file by relative path.
    ///
    /// Returns `false` when no such file is in the inventory. Aggregates are
    /// recomputed so they keep describing the included subset only.
    pub fn set_included(&mut self, relative_path: &str, included: bool, token_factor: u64) -> bool {
        let Some(file) = self
            .files
            .iter_mut()
            .find(|f| f.relative_path == relative_path)
        else {
            return false;
        };
        file.included = included;
        if !included {
            self.contents.remove(relative_path);
        }
        self.recompute_totals(token_factor);
        true
    }

    /// Recompute size and token aggregates from the included subset
    pub fn recompute_totals(&mut self, token_factor: u64) {
        self.total_size = self.included().map(|f| f.size).sum();
        self.estimated_tokens = self.total_size / token_factor.max(1);
    }

    /// Concatenate loaded contents in inventory order
    pub fn combined_content(&self) -> String {
        let mut out = String::new();
        for file in self.included() {
            if let Some(text) = self.contents.get(&file.relative_path) {
                if !out.is_empty() {
                    out.push_str("\n\n");
                }
                out.push_str("=== FILE: ");
                out.push_str(&file.relative_path);
                out.push_str(" ===\n");
                out.push_str(text);
            }
        }
        out
    }

    /// Look up a detected artifact by file name, ignoring case
    pub fn artifact(&self, file_name: &str) -> Option<&ExistingArtifact> {
        self.existing.get(file_name).or_else(|| {
            self.existing
                .values()
                .find(|a| a.file_name.eq_ignore_ascii_case(file_name))
        })
    }
}
