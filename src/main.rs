//! imagediff: cover/stego image comparison and payload extraction tool
//!
//! Compares image pairs with pluggable comparators and aggregates the
//! results into one JSON report.

#![allow(clippy::too_many_lines, clippy::needless_pass_by_value)]

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use imagediff::{
    cli,
    config::{
        AppConfig, CorrespondenceConfig, DiffConfig, DiffPaths, ExecutionConfig, ExtractConfig,
        OutputConfig, Validatable,
    },
    correspondence::Filters,
    pipeline::exit_codes,
    strategies::parse_assignment,
};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imagediff")]
#[command(version)]
#[command(about = "Compare cover and stego images and extract hidden payloads", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (failed comparisons are reported but tolerated)
    1  Fatal error (bad input, unknown strategy, invalid parameter)
    2  Some comparisons or extractions failed and --fail-on-error was set

EXAMPLES:
    # Compare one pair and print the report
    imagediff diff -c cover.png -s stego.png

    # Compare directories listed in a correspondence table
    imagediff diff -c covers/ -s stegos/ -l pairs.csv -F tool=steghide -o report.json

    # Only the 2 lowest bits of the pixel difference, in parallel
    imagediff diff -c covers/ -s stegos/ --comparator pixel -P pixel.bitDepth=2 --parallel

    # Extract LSB payloads
    imagediff extract -s stegos/ -o payloads/ -P lsb.bitsPerChannel=2")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Options shared by `diff` and `extract`
#[derive(Args)]
struct RunArgs {
    /// CSV correspondence table (header row with cover/stego file name columns)
    #[arg(short = 'l', long = "correspondence-list", value_name = "CSV")]
    correspondence_list: Option<PathBuf>,

    /// Keep only table rows where COLUMN equals VALUE (repeatable, all must match)
    #[arg(short = 'F', long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    filters: Vec<(String, String)>,

    /// Strategy parameter (repeatable)
    #[arg(short = 'P', long = "param", value_name = "STRATEGY.PARAM=VALUE", value_parser = parse_assignment)]
    params: Vec<(String, String)>,

    /// Process items on a worker pool
    #[arg(long, overrides_with = "no_parallel")]
    parallel: bool,

    /// Process items one after another
    #[arg(long, overrides_with = "parallel")]
    no_parallel: bool,

    /// Worker threads per CPU in parallel mode
    #[arg(long, value_name = "N")]
    worker_multiplier: Option<usize>,

    /// Upper bound on worker threads
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Per-item time budget in seconds
    #[arg(long, value_name = "SECS")]
    task_deadline: Option<u64>,

    /// Exit with code 2 if any comparison or extraction failed
    #[arg(long)]
    fail_on_error: bool,
}

/// Arguments for the `diff` subcommand
#[derive(Args)]
struct DiffArgs {
    /// Cover image file or directory
    #[arg(short, long)]
    cover: PathBuf,

    /// Stego image file or directory
    #[arg(short, long)]
    stego: PathBuf,

    /// Report file, or the output directory with --split (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write one report per image pair into the output directory
    #[arg(long)]
    split: bool,

    /// Comparator to run (repeatable; all registered comparators if omitted)
    #[arg(short = 'C', long = "comparator", value_name = "NAME")]
    comparators: Vec<String>,

    /// Maximum length of string values in the report (0 = unlimited)
    #[arg(short = 'L', long, value_name = "N")]
    max_value_len: Option<usize>,

    /// Do not truncate string values
    #[arg(long)]
    no_truncate: bool,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    #[command(flatten)]
    run: RunArgs,
}

/// Arguments for the `extract` subcommand
#[derive(Args)]
struct ExtractArgs {
    /// Stego image file or directory
    #[arg(short, long)]
    stego: PathBuf,

    /// Directory receiving the payload files and the manifest
    #[arg(short, long)]
    output: PathBuf,

    /// Extractor to run (repeatable; all registered extractors if omitted)
    #[arg(short = 'E', long = "extractor", value_name = "NAME")]
    extractors: Vec<String>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare cover and stego images
    Diff(DiffArgs),

    /// Extract raw payloads from stego images
    Extract(ExtractArgs),

    /// List the registered comparators and extractors
    Strategies,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the JSON Schema of the configuration file
    ConfigSchema {
        /// Write the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show where configuration files are searched
    Path,
    /// Write an example configuration file to the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            exit_codes::ERROR
        }
    };
    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Diff(args) => {
            let app = load_app_config(cli.config.as_deref())?;
            cli::run_diff(build_diff_config(args, &app))
        }

        Commands::Extract(args) => {
            let app = load_app_config(cli.config.as_deref())?;
            cli::run_extract(build_extract_config(args, &app))
        }

        Commands::Strategies => {
            cli::run_strategies();
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "imagediff", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = imagediff::config::generate_json_schema()
                .context("failed to generate config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => {
            run_config_action(action, cli.config.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_config_action(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = imagediff::config::load_or_default(explicit);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
            Ok(())
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                ::dirs::config_dir().map(|p| p.join("imagediff").display().to_string()),
                ::dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in &[
                ".imagediff.yaml",
                ".imagediff.yml",
                "imagediff.yaml",
                "imagediff.yml",
            ] {
                eprintln!("  {name}");
            }
            eprintln!();
            if let Some(path) = imagediff::config::default_config_path() {
                eprintln!("User config file: {}", path.display());
            }
            match imagediff::config::discover_config_file(explicit) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".imagediff.yaml");
            if target.exists() {
                bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = imagediff::config::generate_example_config();
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
            Ok(())
        }
    }
}

// ============================================================================
// Config assembly: file values, overridden by the command line
// ============================================================================

fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (config, loaded_from) =
        imagediff::config::load_config(explicit).context("failed to load config")?;
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let listing = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        bail!("invalid configuration: {listing}");
    }
    Ok(config)
}

fn build_execution(run: &RunArgs, file: &ExecutionConfig) -> ExecutionConfig {
    let mut execution = file.clone();
    if run.parallel {
        execution.parallel = true;
    } else if run.no_parallel {
        execution.parallel = false;
    }
    if let Some(multiplier) = run.worker_multiplier {
        execution.worker_multiplier = multiplier.max(1);
    }
    if run.max_workers.is_some() {
        execution.max_workers = run.max_workers.map(|n| n.max(1));
    }
    if run.task_deadline.is_some() {
        execution.task_deadline_secs = run.task_deadline;
    }
    execution
}

fn build_correspondence(run: &RunArgs) -> CorrespondenceConfig {
    CorrespondenceConfig {
        table: run.correspondence_list.clone(),
        filters: run.filters.iter().cloned().collect::<Filters>(),
    }
}

/// File params first, then command-line params on top.
fn merge_params(
    mut params: BTreeMap<String, String>,
    overrides: &[(String, String)],
) -> BTreeMap<String, String> {
    params.extend(overrides.iter().cloned());
    params
}

fn build_diff_config(args: DiffArgs, app: &AppConfig) -> DiffConfig {
    let mut output: OutputConfig = app.output.clone();
    if let Some(max) = args.max_value_len {
        output.max_value_len = max;
    }
    if args.no_truncate {
        output.truncate = false;
    }
    if args.compact {
        output.pretty = false;
    }

    DiffConfig {
        paths: DiffPaths {
            cover: args.cover,
            stego: args.stego,
        },
        correspondence: build_correspondence(&args.run),
        output_path: args.output,
        split: args.split,
        comparators: if args.comparators.is_empty() {
            app.strategies.comparators.clone()
        } else {
            args.comparators
        },
        params: merge_params(app.strategies.comparator_params(), &args.run.params),
        execution: build_execution(&args.run, &app.execution),
        output,
        fail_on_error: args.run.fail_on_error,
    }
}

fn build_extract_config(args: ExtractArgs, app: &AppConfig) -> ExtractConfig {
    ExtractConfig {
        stego: args.stego,
        correspondence: build_correspondence(&args.run),
        output_dir: args.output,
        extractors: if args.extractors.is_empty() {
            app.strategies.extractors.clone()
        } else {
            args.extractors
        },
        params: merge_params(app.strategies.extractor_params(), &args.run.params),
        execution: build_execution(&args.run, &app.execution),
        fail_on_error: args.run.fail_on_error,
    }
}
