//! Init Command
//!
//! Initialize contextstudio in the current directory.

use crate::cli::ui::Output;
use crate::cli::util::is_initialized;
use crate::config::{ConfigLoader, PROJECT_DIR};
use crate::types::{Result, StudioError};

pub fn run(force: bool) -> Result<()> {
    if is_initialized() && !force {
        return Err(StudioError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    ConfigLoader::init_project(force)?;

    // Global config is created once and never overwritten here
    if let Err(e) = ConfigLoader::init_global(false) {
        tracing::debug!("Global config init skipped: {}", e);
    }

    let out = Output::new();
    out.success(&format!("Initialized contextstudio in {}/", PROJECT_DIR));
    out.field("Config", &ConfigLoader::project_config_path().display().to_string());
    println!();
    println!("Next steps:");
    println!("  1. Set GEMINI_API_KEY (or llm.api_key in the config)");
    println!("  2. Run 'contextstudio estimate' to preview the cost");
    println!("  3. Run 'contextstudio generate --kind architecture' to write docs");

    Ok(())
}
