//! Generate Command
//!
//! Full pipeline: scan, read, build one prompt per document kind, price it,
//! then generate with bounded concurrency and record every outcome in the
//! cost ledger.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::ai::{
    CustomPrompts, FocusArea, GenerationOrchestrator, GenerationOutcome, ProjectType,
    PromptBuilder, SmartPreset, create_provider,
};
use crate::cli::progress::{ConsoleRenderer, ProgressTracker, format_duration};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ScanRequest, scan_project};
use crate::config::ConfigLoader;
use crate::estimate::{context_usage, estimate_tokens, format_token_count};
use crate::ledger::CostHistoryLedger;
use crate::pricing::{CostCalculator, CostEstimate, format_cost, price_for};
use crate::scanner::artifact_for;
use crate::types::{CancelToken, DocumentKind, Result, ScanInventory, StudioError};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub path: Option<PathBuf>,
    pub kinds: Vec<DocumentKind>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub project_type: Option<ProjectType>,
    pub focus: Vec<FocusArea>,
    pub notes: Option<String>,
    pub exclude: Vec<String>,
    pub dry_run: bool,
}

impl GenerateOptions {
    /// Preset from the profile flags; `None` when none were given
    fn preset(&self) -> Option<SmartPreset> {
        if self.project_type.is_none() && self.focus.is_empty() && self.notes.is_none() {
            return None;
        }
        let mut preset = SmartPreset::new(self.project_type.unwrap_or_default());
        for area in &self.focus {
            preset = preset.with_focus(*area);
        }
        if let Some(notes) = &self.notes {
            preset = preset.with_notes(notes.clone());
        }
        Some(preset)
    }
}

/// One document to generate
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub kind: DocumentKind,
    pub prompt: String,
    pub prompt_tokens: u64,
    pub estimate: CostEstimate,
}

/// Result of one job
#[derive(Debug)]
pub struct JobReport {
    pub kind: DocumentKind,
    pub outcome: GenerationOutcome,
    pub written: Option<PathBuf>,
}

/// Build and price one prompt per distinct kind, in request order
pub fn plan_jobs(
    kinds: &[DocumentKind],
    inventory: &ScanInventory,
    builder: &PromptBuilder,
    preset: Option<&SmartPreset>,
    calculator: &CostCalculator,
    model: &str,
) -> Vec<GenerationJob> {
    let content = inventory.combined_content();
    let mut seen = Vec::new();

    kinds
        .iter()
        .filter(|k| {
            if seen.contains(*k) {
                false
            } else {
                seen.push(**k);
                true
            }
        })
        .map(|&kind| {
            let prompt = builder.build(kind, &content, preset, artifact_for(inventory, kind));
            let prompt_tokens = estimate_tokens(&prompt, None);
            let estimate = calculator.estimate_from_tokens(prompt_tokens, model, None, true);
            GenerationJob {
                kind,
                prompt,
                prompt_tokens,
                estimate,
            }
        })
        .collect()
}

/// Shared collaborators for job execution
pub struct JobRunner {
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub ledger: Arc<CostHistoryLedger>,
    pub calculator: CostCalculator,
    pub tracker: ProgressTracker,
    pub model: String,
    pub output_dir: PathBuf,
    pub workers: usize,
}

impl JobRunner {
    /// Run `jobs` with at most `workers` in flight; reports come back in
    /// completion order
    pub async fn execute(&self, jobs: Vec<GenerationJob>, cancel: &CancelToken) -> Vec<JobReport> {
        for job in &jobs {
            self.tracker.add_task(job.kind.file_name());
        }

        stream::iter(jobs)
            .map(|job| self.execute_one(job, cancel))
            .buffer_unordered(self.workers.max(1))
            .collect()
            .await
    }

    async fn execute_one(&self, job: GenerationJob, cancel: &CancelToken) -> JobReport {
        let task = job.kind.file_name();
        let progress = self.tracker.callback(task);
        let outcome = self
            .orchestrator
            .generate(&self.model, job.kind, &job.prompt, &progress, cancel)
            .await;

        self.record(&job, &outcome).await;

        let mut written = None;
        match (&outcome.content, outcome.success) {
            (Some(content), true) => {
                let path = self.output_dir.join(task);
                match write_document(&path, content).await {
                    Ok(()) => {
                        info!(path = %path.display(), "Wrote document");
                        self.tracker.finish_task(task, true, "written");
                        written = Some(path);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to write document");
                        self.tracker.finish_task(task, false, "write failed");
                    }
                }
            }
            _ => {
                let reason = outcome.error.as_deref().unwrap_or("failed");
                self.tracker.finish_task(task, false, reason);
            }
        }

        JobReport {
            kind: job.kind,
            outcome,
            written,
        }
    }

    /// Ledger entry per outcome; cancelled jobs that never reached the
    /// service are skipped. The ledger persists synchronously, so the append
    /// runs on the blocking pool.
    async fn record(&self, job: &GenerationJob, outcome: &GenerationOutcome) {
        if outcome.is_cancelled() && outcome.retries == 0 {
            return;
        }

        let (actual_tokens, actual_cost) = if outcome.success {
            let actual = self.calculator.usage_cost(
                job.prompt_tokens,
                outcome.tokens_used,
                &self.model,
                Some(job.estimate.currency),
            );
            (Some(actual.total_tokens), Some(actual.total_cost))
        } else {
            (None, None)
        };

        let ledger = Arc::clone(&self.ledger);
        let estimate = job.estimate.clone();
        let appended = tokio::task::spawn_blocking(move || {
            ledger.append(&estimate, actual_tokens, actual_cost);
        })
        .await;
        if let Err(e) = appended {
            warn!(kind = %job.kind.key(), error = %e, "Ledger update did not complete");
        }
    }
}

async fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    if options.kinds.is_empty() {
        return Err(StudioError::Config(
            "At least one --kind is required".to_string(),
        ));
    }

    let ctx = CommandContext::load()?;
    let root = ctx.resolve_root(options.path.clone());
    let model = ctx.model(options.model.clone());
    let output_dir = options
        .output
        .clone()
        .map(|p| ctx.resolve_root(Some(p)))
        .unwrap_or_else(|| root.clone());
    let out = Output::new();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let tracker = ProgressTracker::new();
    tracker.start();
    let render = ConsoleRenderer::new(tracker.clone()).start_render_loop();
    let scanned = scan_project(
        &root,
        ctx.scan_policy(),
        ScanRequest {
            exclude: options.exclude.clone(),
            read_contents: true,
            detect_artifacts: true,
        },
        tracker.callback("scan"),
        cancel.clone(),
    )
    .await;
    tracker.finish_task("scan", scanned.is_ok(), "scan complete");

    let inventory = match scanned {
        Ok(inv) if inv.cancelled => {
            tracker.finish(false, "cancelled");
            let _ = render.await;
            return Err(StudioError::Cancelled);
        }
        Ok(inv) if inv.contents.is_empty() => {
            tracker.finish(false, "nothing to read");
            let _ = render.await;
            return Err(StudioError::Config(format!(
                "No readable source files under {}",
                root.display()
            )));
        }
        Ok(inv) => inv,
        Err(e) => {
            tracker.finish(false, "scan failed");
            let _ = render.await;
            return Err(e);
        }
    };

    let custom = CustomPrompts::load(&ConfigLoader::custom_prompts_path(&ctx.config));
    let builder = PromptBuilder::with_custom(custom);
    let calculator = ctx.calculator();
    let preset = options.preset();
    let jobs = plan_jobs(
        &options.kinds,
        &inventory,
        &builder,
        preset.as_ref(),
        &calculator,
        &model,
    );

    if options.dry_run {
        tracker.finish(true, "dry run");
        let _ = render.await;
        print_plan(&out, &jobs, inventory.contents.len());
        return Ok(());
    }

    let provider = match create_provider(&ctx.config.llm) {
        Ok(p) => p,
        Err(e) => {
            tracker.finish(false, "provider unavailable");
            let _ = render.await;
            return Err(e);
        }
    };

    let runner = JobRunner {
        orchestrator: Arc::new(GenerationOrchestrator::from_config(
            provider,
            &ctx.config.generation,
            &ctx.config.llm,
        )),
        ledger: Arc::new(ctx.ledger()),
        calculator,
        tracker: tracker.clone(),
        model: model.clone(),
        output_dir,
        workers: ctx.config.generation.workers,
    };

    let reports = runner.execute(jobs, &cancel).await;
    let all_ok = reports.iter().all(|r| r.written.is_some());
    tracker.finish(all_ok, "generation complete");
    let _ = render.await;

    print_reports(&out, &reports);

    if cancel.is_cancelled() {
        return Err(StudioError::Cancelled);
    }
    if !all_ok {
        return Err(StudioError::LlmApi(format!(
            "{} of {} documents failed",
            reports.iter().filter(|r| r.written.is_none()).count(),
            reports.len()
        )));
    }
    Ok(())
}

fn print_plan(out: &Output, jobs: &[GenerationJob], files_read: usize) {
    out.header(&format!("Generation Plan ({} files read)", files_read));
    println!();
    let mut total = 0.0;
    for job in jobs {
        let usage = context_usage(job.prompt_tokens, price_for(&job.estimate.model_id));
        total += job.estimate.total_cost;
        println!(
            "  {:<26} {:>10} tokens  {:>10}  {:>5.1}% context{}",
            job.kind.file_name(),
            format_token_count(job.prompt_tokens),
            job.estimate.formatted_total(),
            usage.percent,
            if usage.fits { "" } else { "  (too large)" }
        );
    }
    if let Some(first) = jobs.first() {
        out.field("Estimated total", &format_cost(total, first.estimate.currency));
    }
    out.info("Dry run: nothing was sent");
}

fn print_reports(out: &Output, reports: &[JobReport]) {
    out.section("Results");
    for report in reports {
        let elapsed = format_duration(report.outcome.elapsed.as_secs());
        match &report.written {
            Some(path) => out.success(&format!(
                "{} -> {} ({} tokens, {} retries, {})",
                report.kind.label(),
                path.display(),
                format_token_count(report.outcome.tokens_used),
                report.outcome.retries,
                elapsed
            )),
            None => out.error(&format!(
                "{}: {}",
                report.kind.label(),
                report.outcome.error.as_deref().unwrap_or("output not written")
            )),
        }
    }
}
