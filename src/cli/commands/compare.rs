//! Compare Command
//!
//! Rank models by the cost of the same input.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::estimate::{context_usage, format_token_count};
use crate::pricing::{CostEstimate, format_cost, price_for};
use crate::types::Result;

pub fn run(tokens: u64, currency: Option<String>, models: Vec<String>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let currency = ctx.currency(currency.as_deref())?;
    let calculator = ctx.calculator();

    let list = (!models.is_empty()).then_some(models.as_slice());
    let ranked = calculator.compare_models(tokens, list, Some(currency));

    let out = Output::new();
    out.header(&format!(
        "Model Comparison ({} input tokens)",
        format_token_count(tokens)
    ));
    println!();
    for line in render_table(&ranked) {
        println!("{}", line);
    }
    Ok(())
}

fn render_table(ranked: &[CostEstimate]) -> Vec<String> {
    let mut lines = vec![format!(
        "  {:<3} {:<34} {:>12} {:>12} {:>12}  {}",
        "#", "Model", "Input", "Output", "Total", "Fits"
    )];
    for (i, estimate) in ranked.iter().enumerate() {
        let fits = context_usage(estimate.input_tokens, price_for(&estimate.model_id)).fits;
        lines.push(format!(
            "  {:<3} {:<34} {:>12} {:>12} {:>12}  {}",
            i + 1,
            estimate.model_id,
            format_cost(estimate.input_cost, estimate.currency),
            format_cost(estimate.output_cost, estimate.currency),
            estimate.formatted_total(),
            if fits { "yes" } else { "no" }
        ));
    }
    lines
}
