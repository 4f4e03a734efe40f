//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use rules_assembler_core::pipeline::{self, RunSummary};
use rules_assembler_shared::{
    AggregateOutcome, AppConfig, BuildPlan, MergeOutcome, config_file_path, init_config,
    load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// rules-assembler: combine per-directory rule documents into one rules file.
#[derive(Parser)]
#[command(
    name = "rules-assembler",
    version,
    about = "Aggregate the Markdown rules of several directories and merge them into one file.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Root directory containing the source directories.
    #[arg(long, default_value = ".", global = true, env = "RULES_ASSEMBLER_ROOT")]
    pub root: PathBuf,

    /// Config file (defaults to <root>/rules-assembler.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Aggregate every source directory and write the merged rules file.
    Build,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with the default sources.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rules_assembler=info",
        1 => "rules_assembler=debug",
        _ => "rules_assembler=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `config show` output stays clean on stdout.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&cli.root));

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => cmd_build(&cli.root, &config_path, cli.config.is_some()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&config_path),
            ConfigAction::Show => cmd_config_show(&config_path, cli.config.is_some()),
        },
    }
}

/// Load the config. An explicitly named file must exist.
fn resolve_config(path: &Path, explicit: bool) -> Result<AppConfig> {
    let config = if explicit {
        load_config_from(path)
    } else {
        load_config(path)
    };
    config.wrap_err_with(|| format!("cannot load config from {}", path.display()))
}

fn cmd_build(root: &Path, config_path: &Path, explicit_config: bool) -> Result<()> {
    let root = std::fs::canonicalize(root)
        .wrap_err_with(|| format!("cannot resolve root directory {}", root.display()))?;
    let config = resolve_config(config_path, explicit_config)?;
    let plan = BuildPlan::new(&config, &root);

    info!(
        root = %root.display(),
        sources = plan.sources.len(),
        "assembling rules"
    );

    let summary = pipeline::run(&plan);
    print_summary(&summary);

    Ok(())
}

/// Print a human-readable summary of the run.
fn print_summary(summary: &RunSummary) {
    println!();
    for outcome in &summary.aggregates {
        match outcome {
            AggregateOutcome::Written(file) => println!(
                "  {:<12} {} document(s) -> {}",
                file.source,
                file.document_count,
                file.path.display()
            ),
            AggregateOutcome::NoEligibleDocuments { source, .. } => {
                println!("  {source:<12} skipped (no documents)")
            }
            AggregateOutcome::Failed { source, error } => {
                println!("  {source:<12} failed: {error}")
            }
        }
    }

    match &summary.merge {
        MergeOutcome::Written(report) => {
            println!();
            println!("  Rules merged into {}", report.output.display());
            println!("  Sections: {}", report.sections.join(", "));
            if !report.skipped.is_empty() {
                println!("  Skipped:  {}", report.skipped.len());
            }
            println!("  SHA-256:  {}", report.sha256);
        }
        MergeOutcome::Failed { output, error } => {
            println!();
            println!("  Merge into {} failed: {error}", output.display());
        }
    }
    println!("  Time:     {:.2}s", summary.elapsed.as_secs_f64());
    println!();
}

fn cmd_config_init(config_path: &Path) -> Result<()> {
    let path = init_config(config_path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: &Path, explicit_config: bool) -> Result<()> {
    let config = resolve_config(config_path, explicit_config)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
