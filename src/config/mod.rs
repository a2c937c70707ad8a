//! Configuration Management
//!
//! Hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (user config dir, config.toml)
//! 3. Project config (.contextstudio/config.toml)
//! 4. Environment variables (CONTEXTSTUDIO_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_DIR};
pub use types::*;
