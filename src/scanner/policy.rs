//! Scan rules as a value object

use std::collections::HashSet;

use crate::config::ScanConfig;

/// Rules deciding which directories are walked and which files are kept
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub max_depth: usize,
    pub max_file_size: u64,
    pub ignored_dirs: HashSet<String>,
    /// Lowercase, with leading dot
    pub supported_extensions: HashSet<String>,
    pub allowed_dotfiles: HashSet<String>,
    pub token_factor: u64,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

fn normalize_extension(ext: &str) -> String {
    let lowered = ext.trim().to_lowercase();
    if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{}", lowered)
    }
}

impl ScanPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_file_size: config.max_file_size,
            ignored_dirs: config.ignored_dirs.iter().cloned().collect(),
            supported_extensions: config
                .supported_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .collect(),
            allowed_dotfiles: config.allowed_dotfiles.iter().cloned().collect(),
            token_factor: config.token_factor.max(1),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_ignored_dir(mut self, name: impl Into<String>) -> Self {
        self.ignored_dirs.insert(name.into());
        self
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.supported_extensions.insert(normalize_extension(ext));
        self
    }

    pub fn with_allowed_dotfile(mut self, name: impl Into<String>) -> Self {
        self.allowed_dotfiles.insert(name.into());
        self
    }

    pub fn with_token_factor(mut self, factor: u64) -> Self {
        self.token_factor = factor.max(1);
        self
    }

    /// Hidden names are skipped unless allow-listed
    pub fn is_hidden_skipped(&self, name: &str) -> bool {
        name.starts_with('.') && !self.allowed_dotfiles.contains(name)
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(name)
    }

    /// `ext` is lowercase with leading dot, or empty
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        !ext.is_empty() && self.supported_extensions.contains(ext)
    }

    pub fn within_size(&self, size: u64) -> bool {
        size <= self.max_file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.max_depth, crate::constants::scan::MAX_DEPTH);
        assert_eq!(policy.token_factor, 4);
        assert!(policy.is_ignored_dir("node_modules"));
        assert!(policy.is_supported_extension(".py"));
        assert!(!policy.is_supported_extension(".png"));
        assert!(!policy.is_supported_extension(""));
    }

    #[test]
    fn test_dotfile_rules() {
        let policy = ScanPolicy::default();
        assert!(policy.is_hidden_skipped(".git"));
        assert!(!policy.is_hidden_skipped(".env.example"));
        assert!(!policy.is_hidden_skipped("src"));
    }

    #[test]
    fn test_builder_normalizes_extensions() {
        let policy = ScanPolicy::default()
            .with_extension("LOG")
            .with_max_file_size(10)
            .with_token_factor(0);
        assert!(policy.is_supported_extension(".log"));
        assert!(policy.within_size(10));
        assert!(!policy.within_size(11));
        assert_eq!(policy.token_factor, 1);
    }
}
