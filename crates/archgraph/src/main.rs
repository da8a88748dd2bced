use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use archgraph_core::config::{Config, CONFIG_FILE_NAME};
use archgraph_core::{
    AnalysisEngine, AnalysisOutcome, ArchitecturePattern, CancellationToken, FactSet, Report,
};
use archgraph_report::{json, markdown, text};

#[derive(Parser)]
#[command(name = "archgraph")]
#[command(about = "Check import graphs against architecture rules and score project health")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a facts file and print the full report
    Analyze {
        /// Path to the facts JSON produced by the extractor
        facts: PathBuf,
        /// Config file path (defaults to .archgraph.toml in the current directory or above)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
        /// Cancel the run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Analyze and exit with code 0 (pass) or 1 (blocked violations found)
    Check {
        /// Path to the facts JSON produced by the extractor
        facts: PathBuf,
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
        /// Cancel the run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Create a default .archgraph.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
        /// Enable a canned rule set: hexagonal, clean, mvc or layered
        #[arg(long)]
        preset: Option<ArchitecturePattern>,
    },
}

/// Exit code for a run cancelled before it produced a report.
const EXIT_CANCELLED: i32 = 130;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            facts,
            config,
            format,
            compact,
            timeout,
        } => cmd_analyze(&facts, config.as_deref(), format, compact, timeout),
        Commands::Check {
            facts,
            config,
            format,
            compact,
            timeout,
        } => cmd_check(&facts, config.as_deref(), format, compact, timeout),
        Commands::Init { force, preset } => cmd_init(force, preset),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn cmd_analyze(
    facts_path: &Path,
    config_path: Option<&Path>,
    format: Format,
    compact: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let report = run_analysis(facts_path, config_path, timeout)?;
    let output = match format {
        Format::Json => json::format_report(&report, compact)?,
        Format::Text => text::format_report(&report),
        Format::Markdown => markdown::format_report(&report),
    };
    print_output(&output, format);
    Ok(())
}

fn cmd_check(
    facts_path: &Path,
    config_path: Option<&Path>,
    format: Format,
    compact: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let report = run_analysis(facts_path, config_path, timeout)?;
    let (output, passed) = match format {
        Format::Json => json::format_check(&report, compact)?,
        Format::Text => text::format_check(&report),
        Format::Markdown => markdown::format_check(&report),
    };
    print_output(&output, format);
    if !passed {
        process::exit(1);
    }
    Ok(())
}

fn print_output(output: &str, format: Format) {
    if format == Format::Json {
        println!("{output}");
    } else {
        print!("{output}");
    }
}

fn cmd_init(force: bool, preset: Option<ArchitecturePattern>) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    let mut content = Config::default_toml();
    if let Some(preset) = preset {
        content = content.replacen(
            "# preset = \"layered\"",
            &format!("preset = \"{preset}\""),
            1,
        );
    }
    std::fs::write(&target, content)
        .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
    match preset {
        Some(preset) => println!("Created {CONFIG_FILE_NAME} with the {preset} preset."),
        None => println!("Created {CONFIG_FILE_NAME} with default configuration."),
    }
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            Ok(Config::load_or_default(&cwd))
        }
    }
}

/// Load facts and config, run the engine and exit 130 if the run was cancelled.
fn run_analysis(
    facts_path: &Path,
    config_path: Option<&Path>,
    timeout: Option<u64>,
) -> Result<Report> {
    let config = load_config(config_path)?;
    let facts = FactSet::load(facts_path)?;
    let engine = AnalysisEngine::new(&config).context("invalid configuration")?;

    let token = CancellationToken::new();
    if let Some(secs) = timeout {
        let watchdog = token.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            watchdog.cancel();
        });
    }

    match engine
        .run(&facts, &token)
        .with_context(|| format!("analysis of '{}' failed", facts_path.display()))?
    {
        AnalysisOutcome::Completed(report) => Ok(report),
        AnalysisOutcome::Cancelled { phase } => {
            eprintln!("Cancelled before {phase}.");
            process::exit(EXIT_CANCELLED);
        }
    }
}
