use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contextstudio::ai::{FocusArea, ProjectType};
use contextstudio::cli::commands;
use contextstudio::constants::ledger::{DEFAULT_RECENT, DEFAULT_SPEND_DAYS};
use contextstudio::types::DocumentKind;

#[derive(Parser)]
#[command(name = "contextstudio")]
#[command(
    version,
    about = "Token-aware, cost-bounded AI documentation generator for source trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize contextstudio in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing initialization")]
        force: bool,
    },

    /// Scan a project and summarize the files that would be sent
    Scan {
        #[arg(help = "Project root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Relative path to exclude (repeatable)")]
        exclude: Vec<String>,
    },

    /// Estimate the cost of sending a project to a model
    Estimate {
        #[arg(help = "Project root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(long, short, help = "Model to price")]
        model: Option<String>,
        #[arg(long, short, help = "Currency: USD, EUR, GBP, JPY")]
        currency: Option<String>,
        #[arg(long = "no-output", help = "Price input tokens only")]
        no_output: bool,
        #[arg(long, help = "Relative path to exclude (repeatable)")]
        exclude: Vec<String>,
    },

    /// Rank models by cost for a token count
    Compare {
        #[arg(long, short, help = "Input token count")]
        tokens: u64,
        #[arg(long, short, help = "Currency: USD, EUR, GBP, JPY")]
        currency: Option<String>,
        #[arg(long = "model", short, help = "Model to include (repeatable, default: all)")]
        models: Vec<String>,
    },

    /// Generate documentation for a project
    Generate {
        #[arg(help = "Project root (default: current directory)")]
        path: Option<PathBuf>,
        #[arg(
            long = "kind",
            short,
            required = true,
            help = "Document kind, e.g. architecture, rules, api-docs (repeatable)"
        )]
        kinds: Vec<DocumentKind>,
        #[arg(long, short, help = "Model to use")]
        model: Option<String>,
        #[arg(long, short, help = "Output directory (default: project root)")]
        output: Option<PathBuf>,
        #[arg(long = "project-type", help = "Project type, e.g. web-backend, library")]
        project_type: Option<ProjectType>,
        #[arg(long, help = "Focus area (repeatable)")]
        focus: Vec<FocusArea>,
        #[arg(long, help = "Extra notes for the model")]
        notes: Option<String>,
        #[arg(long, help = "Relative path to exclude (repeatable)")]
        exclude: Vec<String>,
        #[arg(long = "dry-run", help = "Build and price prompts without sending")]
        dry_run: bool,
    },

    /// Show cost history
    History {
        #[arg(long, short, default_value_t = DEFAULT_RECENT, help = "Entries to show")]
        limit: usize,
        #[arg(long, short, help = "Currency for spend totals")]
        currency: Option<String>,
        #[arg(long, short, default_value_t = DEFAULT_SPEND_DAYS, help = "Spend window in days")]
        days: i64,
        #[arg(long, short, help = "Only this model")]
        model: Option<String>,
        #[arg(long, help = "Delete all history")]
        clear: bool,
    },

    /// List available generation models
    Models {
        #[arg(long, help = "Bypass the model cache")]
        refresh: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcontextstudio encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { force } => {
            commands::init::run(force)?;
        }
        Commands::Scan {
            path,
            format,
            exclude,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::scan::run(path, &format, exclude))?;
        }
        Commands::Estimate {
            path,
            model,
            currency,
            no_output,
            exclude,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::estimate::run(commands::estimate::EstimateOptions {
                path,
                model,
                currency,
                no_output,
                exclude,
            }))?;
        }
        Commands::Compare {
            tokens,
            currency,
            models,
        } => {
            commands::compare::run(tokens, currency, models)?;
        }
        Commands::Generate {
            path,
            kinds,
            model,
            output,
            project_type,
            focus,
            notes,
            exclude,
            dry_run,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::generate::run(commands::generate::GenerateOptions {
                path,
                kinds,
                model,
                output,
                project_type,
                focus,
                notes,
                exclude,
                dry_run,
            }))?;
        }
        Commands::History {
            limit,
            currency,
            days,
            model,
            clear,
        } => {
            commands::history::run(commands::history::HistoryOptions {
                limit,
                currency,
                days,
                model,
                clear,
            })?;
        }
        Commands::Models { refresh } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::models::run(refresh))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    commands::config::init_global(force)?;
                } else {
                    commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
