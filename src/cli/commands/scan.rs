//! Scan Command
//!
//! Walk a project tree and summarize what would be sent for generation.

use serde::Serialize;
use std::path::PathBuf;

use crate::cli::progress::{ConsoleRenderer, ProgressTracker};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ScanRequest, scan_project};
use crate::estimate::format_token_count;
use crate::types::{CancelToken, Result, ScanInventory, silent_progress};

#[derive(Debug, Serialize)]
struct ScanSummary<'a> {
    root: String,
    included_files: usize,
    total_files: usize,
    total_size: u64,
    estimated_tokens: u64,
    cancelled: bool,
    files: Vec<&'a str>,
    existing: Vec<ExistingSummary<'a>>,
}

#[derive(Debug, Serialize)]
struct ExistingSummary<'a> {
    file_name: &'a str,
    relative_path: &'a str,
    stale: bool,
}

fn summarize(inventory: &ScanInventory) -> ScanSummary<'_> {
    let mut existing: Vec<ExistingSummary<'_>> = inventory
        .existing
        .values()
        .map(|a| ExistingSummary {
            file_name: &a.file_name,
            relative_path: &a.relative_path,
            stale: a.stale,
        })
        .collect();
    existing.sort_by(|a, b| a.relative_path.cmp(b.relative_path));

    ScanSummary {
        root: inventory.root.display().to_string(),
        included_files: inventory.included_count(),
        total_files: inventory.files.len(),
        total_size: inventory.total_size,
        estimated_tokens: inventory.estimated_tokens,
        cancelled: inventory.cancelled,
        files: inventory
            .included()
            .map(|f| f.relative_path.as_str())
            .collect(),
        existing,
    }
}

pub async fn run(path: Option<PathBuf>, format: &str, exclude: Vec<String>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let root = ctx.resolve_root(path);
    let as_json = format == "json";

    let request = ScanRequest {
        exclude,
        read_contents: false,
        detect_artifacts: true,
    };

    let inventory = if as_json {
        scan_project(&root, ctx.scan_policy(), request, silent_progress(), CancelToken::new()).await?
    } else {
        let tracker = ProgressTracker::new();
        tracker.start();
        let render = ConsoleRenderer::new(tracker.clone()).start_render_loop();
        let result = scan_project(
            &root,
            ctx.scan_policy(),
            request,
            tracker.callback("scan"),
            CancelToken::new(),
        )
        .await;
        tracker.finish(result.is_ok(), "scan complete");
        let _ = render.await;
        result?
    };

    let summary = summarize(&inventory);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let out = Output::new();
    out.header("Scan Summary");
    out.field("Root", &summary.root);
    out.field(
        "Files",
        &format!("{} included of {}", summary.included_files, summary.total_files),
    );
    out.field("Size", &format!("{} bytes", summary.total_size));
    out.field("Tokens (approx.)", &format_token_count(summary.estimated_tokens));

    if summary.existing.is_empty() {
        out.info("No existing documentation found");
    } else {
        out.section("Existing Documentation");
        for doc in &summary.existing {
            let status = if doc.stale { "stale" } else { "ok" };
            println!("  {:<40} {}", doc.relative_path, status);
        }
    }

    if summary.cancelled {
        out.warning("Scan was cancelled; results are partial");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExistingArtifact, FileRecord};

    #[test]
    fn test_summary_lists_included_and_sorted_docs() {
        let mut inv = ScanInventory::new("/p");
        for (rel, included) in [("a.py", true), ("b.py", false)] {
            inv.files.push(FileRecord {
                path: PathBuf::from("/p").join(rel),
                relative_path: rel.into(),
                size: 10,
                extension: ".py".into(),
                included,
            });
        }
        inv.recompute_totals(4);
        for rel in ["docs/Z.md", "README.md"] {
            let name = rel.rsplit('/').next().unwrap();
            inv.existing.insert(
                name.into(),
                ExistingArtifact {
                    path: PathBuf::from("/p").join(rel),
                    relative_path: rel.into(),
                    file_name: name.into(),
                    content: String::new(),
                    stale: true,
                },
            );
        }

        let summary = summarize(&inv);
        assert_eq!(summary.included_files, 1);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.files, vec!["a.py"]);
        assert_eq!(summary.estimated_tokens, 2);
        assert_eq!(summary.existing[0].relative_path, "README.md");
    }
}
