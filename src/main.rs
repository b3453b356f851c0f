//! jdiff command-line interface.
//!
//! Parses two documents, compares them and prints a git-style diff. Exit code
//! 0 means no difference, 1 means the inputs differ, 2 means an error.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jdiff::{
    compare_raw, format_diff, format_summary, parse_file, parse_stdin, DiffConfig, DiffStats,
    FormatHint, JdiffError, OutputFormat, OutputOptions, Value,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// jdiff - structural diff for JSON, YAML and TOML
///
/// Compares two documents structurally, matching array elements by similarity
/// and reporting additions, removals and changes in a git-style layout.
#[derive(Parser)]
#[command(name = "jdiff")]
#[command(version)]
#[command(about = "Structural diff for JSON, YAML and TOML documents", long_about = None)]
struct Cli {
    /// Old document ("-" reads standard input)
    #[arg(value_name = "FILE1")]
    file1: PathBuf,

    /// New document ("-" reads standard input)
    #[arg(value_name = "FILE2")]
    file2: PathBuf,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "terminal")]
    format: OutputFormatArg,

    /// Disable colours in terminal output
    #[arg(short = 'C', long)]
    no_color: bool,

    /// Show the complete structure, not just the changes
    #[arg(long)]
    full: bool,

    /// Compare only which keys exist, not their values
    #[arg(short = 'k', long, visible_alias = "structure-only")]
    keys_only: bool,

    /// Report only presence changes (added/removed)
    #[arg(long)]
    ignore_values: bool,

    /// Always show this key when its object is shown (repeatable)
    #[arg(short = 'o', long = "output-key", value_name = "KEY")]
    output_keys: Vec<String>,

    /// Exclude this key from comparison at every level (repeatable)
    #[arg(short = 'x', long = "exclude-key", value_name = "KEY")]
    exclude_keys: Vec<String>,

    /// Append similarity percentages to changed strings
    #[arg(short = 's', long)]
    similarity: bool,

    /// Verbose output (log progress to stderr)
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress the summary line)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format argument for clap
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatArg {
    /// Coloured git-style output
    Terminal,
    /// Git-style output without colours
    Plain,
    /// JSON diff tree
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Terminal => OutputFormat::Terminal,
            OutputFormatArg::Plain => OutputFormat::Plain,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    fn diff_config(&self) -> DiffConfig {
        DiffConfig {
            structure_only: self.keys_only,
            ignore_values: self.ignore_values,
            full_output: self.full,
            output_keys: self.output_keys.iter().cloned().collect(),
            ignore_keys: self.exclude_keys.iter().cloned().collect(),
        }
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            color: !self.no_color,
            with_similarity: self.similarity,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    if is_stdin(&cli.file1) && is_stdin(&cli.file2) {
        return Err(JdiffError::ConfigError {
            message: "only one input can be read from stdin".to_string(),
        }
        .into());
    }

    let old = load(&cli.file1).context("Failed to parse first file")?;
    let new = load(&cli.file2).context("Failed to parse second file")?;

    let config = cli.diff_config();
    tracing::info!("Computing diff...");
    let root = compare_raw(&old, &new, &config);
    let stats = DiffStats::from_node(&root);

    let output_format: OutputFormat = cli.format.into();
    if output_format == OutputFormat::Json {
        let output = format_diff(&root, &output_format, &cli.output_options())
            .context("Failed to format diff output")?;
        println!("{}", output);
    } else if root.is_changed() || config.full_output {
        let output = format_diff(&root, &output_format, &cli.output_options())
            .context("Failed to format diff output")?;
        print!("{}", output);
        if !cli.quiet {
            println!();
            println!("{}", format_summary(&stats));
        }
    } else if !cli.quiet {
        println!("No changes detected.");
    }

    Ok(if root.is_changed() { 1 } else { 0 })
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn load(path: &Path) -> Result<Value> {
    if is_stdin(path) {
        tracing::info!("Parsing <stdin>...");
        return Ok(parse_stdin(FormatHint::Auto)?);
    }
    tracing::info!("Parsing {}...", path.display());
    Ok(parse_file(path)?)
}
