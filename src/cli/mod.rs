//! CLI command definitions and handlers

mod analyze;
mod doctor;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Codegauge - composite code-quality scoring for C/C++
#[derive(Parser, Debug)]
#[command(name = "codegauge")]
#[command(
    version,
    about = "Composite code-quality scoring for C/C++ — one calibrated 0-10 score from compiler, sanitizer, and static-analysis findings",
    long_about = "Codegauge runs a set of independent analysis tools (cppcheck, clang-tidy, \
lizard, KWStyle, Infer, plus assertion and test-code scanning) against a C/C++ \
source tree, classifies and normalizes their findings, and folds the per-tool \
scores into one comparable 0-10 quality score.\n\n\
Tools that are not installed, crash, or time out are excluded from the \
composite; the run itself keeps going.\n\n\
Compilation is not driven by codegauge: pass the compiler output of your own \
build via --compiler-log (or a pre-weighted count via --compiler-warnings) and \
a captured sanitizer run via --sanitizer-log to include those scores.",
    after_help = "\
Examples:
  codegauge .                               Score the current directory
  codegauge ~/src/prog --cpp                Score a C++ codebase
  codegauge . --compiler-log build.log      Include classified compiler warnings
  codegauge . --skip-tool infer --format json
  codegauge . --badge README.md             Keep the README badge up to date
  codegauge doctor                          Show which external tools are installed"
)]
pub struct Cli {
    /// Path to the program to analyze (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Number of parallel tool workers (1-64)
    #[arg(long, global = true, default_value = "6", value_parser = parse_workers)]
    pub workers: usize,

    /// Analyze as C++ (default: C)
    #[arg(long)]
    pub cpp: bool,

    /// Path to exclude from analysis (repeatable)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Project-specific assertion macro name (repeatable)
    #[arg(long = "custom-assert", value_name = "NAME")]
    pub custom_asserts: Vec<String>,

    /// Pre-weighted compiler warning count from your build
    #[arg(long, value_name = "N")]
    pub compiler_warnings: Option<f64>,

    /// Compiler output to classify (alternative to --compiler-warnings)
    #[arg(long, value_name = "FILE")]
    pub compiler_log: Option<PathBuf>,

    /// Captured sanitizer output from executing the instrumented program
    #[arg(long, value_name = "FILE")]
    pub sanitizer_log: Option<PathBuf>,

    /// Function count override for function-normalized metrics
    #[arg(long, value_name = "N")]
    pub functions: Option<u64>,

    /// Tool to leave out of the run (repeatable)
    #[arg(long = "skip-tool", value_name = "NAME")]
    pub skip_tool: Vec<String>,

    /// Per-tool timeout in seconds (0 = no timeout); hung tools are
    /// excluded like any other failure
    #[arg(long, default_value = "1800", value_name = "SECS")]
    pub tool_timeout: u64,

    /// Directory for the per-tool result artifacts (default: <path>/.codegauge)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Markdown file receiving the score badge
    #[arg(long, value_name = "FILE")]
    pub badge: Option<PathBuf>,

    /// KWStyle rule configuration file
    #[arg(long, value_name = "FILE")]
    pub kwstyle_xml: Option<PathBuf>,

    /// Debugging mode: abort the run on the first tool failure instead of
    /// excluding the tool
    #[arg(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check which external analysis tools are installed
    Doctor,
}

/// Dispatch to the selected command (default: analyze).
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Doctor) => doctor::run(),
        None => analyze::run(cli),
    }
}
