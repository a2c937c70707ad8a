//! History Command
//!
//! Show recorded estimates, spend totals and estimation accuracy.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::ledger::LedgerEntry;
use crate::pricing::format_cost;
use crate::types::Result;

pub struct HistoryOptions {
    pub limit: usize,
    pub currency: Option<String>,
    pub days: i64,
    pub model: Option<String>,
    pub clear: bool,
}

pub fn run(options: HistoryOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let ledger = ctx.ledger();
    let out = Output::new();

    if options.clear {
        ledger.clear();
        out.success(&format!("Cleared cost history at {}", ledger.path().display()));
        return Ok(());
    }

    let currency = ctx.currency(options.currency.as_deref())?;

    if ledger.is_empty() {
        out.info("No cost history recorded yet");
        return Ok(());
    }

    let entries: Vec<LedgerEntry> = ledger
        .recent(options.limit)
        .into_iter()
        .filter(|e| options.model.as_deref().is_none_or(|m| e.model_id == m))
        .collect();

    out.header("Cost History");
    println!();
    for line in render_entries(&entries) {
        println!("{}", line);
    }

    let spend = ledger.total_spend(currency, options.days);
    let accuracy = ledger.accuracy(options.model.as_deref());

    out.section("Summary");
    out.field(
        &format!("Spend ({}d, {})", options.days, currency.code()),
        &format_cost(spend, currency),
    );
    if accuracy.count > 0 {
        out.field(
            "Accuracy",
            &format!(
                "avg {:.2}  min {:.2}  max {:.2}  ({} samples)",
                accuracy.average, accuracy.min, accuracy.max, accuracy.count
            ),
        );
    } else {
        out.field("Accuracy", "no samples with actual usage");
    }

    Ok(())
}

fn render_entries(entries: &[LedgerEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| {
            let actual = e
                .actual_tokens
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            let ratio = e
                .accuracy_ratio
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "  {}  {:<32} est {:>9}  act {:>9}  {:>10}  ratio {}",
                e.timestamp.format("%Y-%m-%d %H:%M"),
                e.model_id,
                e.estimated_tokens,
                actual,
                format_cost(e.actual_cost.unwrap_or(e.estimated_cost), e.currency),
                ratio
            )
        })
        .collect()
}
