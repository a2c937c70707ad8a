//! Directory scanner
//!
//! Depth-first walk of a project tree under a [`ScanPolicy`]. Entries are
//! visited in name order so repeated scans produce identical inventories.
//! Symlinks are never followed and unreadable directories count as empty.

use std::fs;
use std::path::{Component, Path};
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, info};

use super::encoding::decode_text;
use super::policy::ScanPolicy;
use crate::constants::scan::READ_PROGRESS_EVERY;
use crate::types::{CancelToken, FileRecord, ProgressFn, ScanInventory};

pub struct DirectoryScanner {
    policy: ScanPolicy,
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new(ScanPolicy::default())
    }
}

impl DirectoryScanner {
    pub fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Walk `root` and build an inventory of candidate files.
    ///
    /// A missing or unreadable root yields an empty inventory. On
    /// cancellation the files gathered so far are returned with
    /// `cancelled` set.
    pub fn scan(&self, root: &Path, progress: &ProgressFn, cancel: &CancelToken) -> ScanInventory {
        progress("Scanning files...", 0);

        let mut inventory = ScanInventory::new(root);
        if root.is_dir() {
            self.walk(root, &mut inventory.files, progress, cancel);
        } else {
            debug!(root = %root.display(), "Scan root is not a directory");
        }

        inventory.cancelled = cancel.is_cancelled();
        inventory.recompute_totals(self.policy.token_factor);

        if inventory.cancelled {
            info!(files = inventory.files.len(), "Scan cancelled");
            progress(
                &format!("Scan cancelled after {} files", inventory.files.len()),
                100,
            );
        } else {
            info!(
                root = %root.display(),
                files = inventory.files.len(),
                total_size = inventory.total_size,
                estimated_tokens = inventory.estimated_tokens,
                "Scan complete"
            );
            progress(&format!("Found {} files", inventory.files.len()), 100);
        }

        inventory
    }

    fn walk(
        &self,
        root: &Path,
        files: &mut Vec<FileRecord>,
        progress: &ProgressFn,
        cancel: &CancelToken,
    ) {
        // The walker counts the root as depth 0, its entries as depth 1
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(self.policy.max_depth.saturating_add(1)))
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(entry_filter(self.policy.clone(), cancel.clone()))
            .build();

        let mut dirs_visited: usize = 0;
        for result in walker {
            if cancel.is_cancelled() {
                break;
            }

            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                dirs_visited += 1;
                let rel = relative_path(entry.path(), root);
                let shown = if rel.is_empty() { "." } else { rel.as_str() };
                progress(&format!("Scanning {}", shown), dirs_visited.min(99) as u8);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            let extension = extension_of(path);
            if !self.policy.is_supported_extension(&extension) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !self.policy.within_size(metadata.len()) {
                continue;
            }
            files.push(FileRecord {
                relative_path: relative_path(path, root),
                path: path.to_path_buf(),
                size: metadata.len(),
                extension,
                included: true,
            });
        }
    }

    /// Load text for every included file.
    ///
    /// Entries for files no longer included are dropped first. Files that
    /// cannot be read, and empty files, are left out.
    pub fn read_contents(
        &self,
        inventory: &mut ScanInventory,
        progress: &ProgressFn,
        cancel: &CancelToken,
    ) {
        progress("Reading file contents...", 0);

        let included: Vec<(String, std::path::PathBuf)> = inventory
            .included()
            .map(|f| (f.relative_path.clone(), f.path.clone()))
            .collect();
        inventory
            .contents
            .retain(|rel, _| included.iter().any(|(r, _)| r == rel));

        let total = included.len();
        for (idx, (rel, path)) in included.into_iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(read = idx, total, "Content read cancelled");
                break;
            }

            match fs::read(&path) {
                Ok(bytes) => {
                    let (text, encoding) = decode_text(&bytes);
                    if !text.is_empty() {
                        debug!(file = %rel, ?encoding, "Decoded file");
                        inventory.contents.insert(rel, text);
                    }
                }
                Err(e) => debug!(file = %rel, error = %e, "Skipping unreadable file"),
            }

            if idx % READ_PROGRESS_EVERY == 0 {
                let percent = ((idx * 100) / total.max(1)).min(99) as u8;
                progress(&format!("Reading file {}/{}...", idx + 1, total), percent);
            }
        }

        progress("Read complete", 100);
    }
}

/// Prunes hidden names and ignored directories; once cancelled nothing
/// further is descended into
fn entry_filter(
    policy: ScanPolicy,
    cancel: CancelToken,
) -> impl Fn(&DirEntry) -> bool + Send + Sync + 'static {
    move |entry| {
        if entry.depth() == 0 {
            return true;
        }
        if cancel.is_cancelled() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if policy.is_hidden_skipped(&name) {
            return false;
        }
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        !(is_dir && policy.is_ignored_dir(&name))
    }
}

/// Lowercase extension with leading dot, or empty
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
