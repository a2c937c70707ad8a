//! Models Command
//!
//! List generation models, served from the catalog cache when fresh.

use crate::ai::{ModelCatalogCache, create_provider};
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::constants::pricing::MODEL_PREFIX;
use crate::pricing::{Currency, REGISTRY, format_cost};
use crate::types::Result;

pub async fn run(refresh: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let provider = create_provider(&ctx.config.llm)?;
    let cache = ModelCatalogCache::from_config(
        ConfigLoader::models_cache_path(&ctx.config),
        &ctx.config.cache,
    );

    let models = cache.get_models(provider.as_ref(), refresh).await;
    let out = Output::new();

    if models.is_empty() {
        out.warning("No models available (service unreachable and no cache)");
        return Ok(());
    }

    out.header(&format!("Available Models ({})", models.len()));
    println!();
    for model in &models {
        let name = model.strip_prefix(MODEL_PREFIX).unwrap_or(model);
        match REGISTRY.iter().find(|e| e.model_id == name) {
            Some(entry) => println!(
                "  {:<40} in {:>9}/M  out {:>9}/M",
                name,
                format_cost(entry.input_per_million, Currency::Usd),
                format_cost(entry.output_per_million, Currency::Usd),
            ),
            None => println!("  {:<40} (no pricing data)", name),
        }
    }
    out.dim(&format!("\nCache: {}", cache.path().display()));

    Ok(())
}
