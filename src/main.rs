//! Codegauge - composite code-quality scoring for C/C++
//!
//! Runs a pipeline of independent analysis tools (compiler diagnostics,
//! sanitizers, cppcheck, clang-tidy, lizard, KWStyle, Infer) against a
//! source tree, classifies and normalizes their findings, and folds the
//! per-tool scores into one calibrated 0-10 quality score.

// Allow dead code for public API methods exposed for future features
#![allow(dead_code)]

mod classify;
mod cli;
mod config;
mod discovery;
mod models;
mod report;
mod scoring;
mod tools;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
