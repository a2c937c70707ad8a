//! Estimate Command
//!
//! Scan, read and price a project for one model.

use std::path::PathBuf;

use crate::cli::progress::{ConsoleRenderer, ProgressTracker};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ScanRequest, scan_project};
use crate::estimate::{context_usage, format_token_count};
use crate::pricing::{CostEstimate, format_cost, price_for};
use crate::types::{CancelToken, Result};

pub struct EstimateOptions {
    pub path: Option<PathBuf>,
    pub model: Option<String>,
    pub currency: Option<String>,
    pub no_output: bool,
    pub exclude: Vec<String>,
}

pub async fn run(options: EstimateOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let root = ctx.resolve_root(options.path);
    let model = ctx.model(options.model);
    let currency = ctx.currency(options.currency.as_deref())?;

    let tracker = ProgressTracker::new();
    tracker.start();
    let render = ConsoleRenderer::new(tracker.clone()).start_render_loop();
    let result = scan_project(
        &root,
        ctx.scan_policy(),
        ScanRequest {
            exclude: options.exclude,
            read_contents: true,
            detect_artifacts: false,
        },
        tracker.callback("scan"),
        CancelToken::new(),
    )
    .await;
    tracker.finish(result.is_ok(), "scan complete");
    let _ = render.await;
    let inventory = result?;

    let content = inventory.combined_content();
    let estimate = ctx.calculator().estimate_cost(
        &content,
        &model,
        Some(currency),
        None,
        !options.no_output,
    );

    print_estimate(&estimate, inventory.contents.len());
    Ok(())
}

fn print_estimate(estimate: &CostEstimate, files_read: usize) {
    let out = Output::new();
    let entry = price_for(&estimate.model_id);
    let usage = context_usage(estimate.input_tokens, entry);

    out.header("Cost Estimate");
    out.field("Model", &format!("{} ({})", estimate.model_name, estimate.model_id));
    out.field("Files read", &files_read.to_string());
    out.field("Content", estimate.family.as_str());
    out.field(
        "Input",
        &format!(
            "{} tokens  {}",
            format_token_count(estimate.input_tokens),
            format_cost(estimate.input_cost, estimate.currency)
        ),
    );
    out.field(
        "Output",
        &format!(
            "{} tokens  {}",
            format_token_count(estimate.output_tokens),
            format_cost(estimate.output_cost, estimate.currency)
        ),
    );
    out.field(
        "Total",
        &format!(
            "{} tokens  {}",
            format_token_count(estimate.total_tokens),
            estimate.formatted_total()
        ),
    );
    out.field(
        "Context window",
        &format!(
            "{:.1}% of {}",
            usage.percent,
            format_token_count(usage.context_window)
        ),
    );

    if !usage.fits {
        out.warning("Input exceeds the model's context window; exclude files or pick a larger model");
    }
}
