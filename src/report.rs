//! Run reporting: terminal output, JSON output, and the README badge.

use crate::models::{AnalysisRequest, QualityReport, ToolReport};
use crate::tools::ToolRun;
use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;

/// Render the run as formatted terminal output: every surviving tool's
/// log, one "excluded" line per dropped tool, and the composite score.
pub fn render_text(runs: &[ToolRun], overall: Option<f64>, request: &AnalysisRequest) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Lines of pure code (excluding blank and comment lines): {}",
        request.lines_of_code
    );
    let _ = writeln!(out, "Analyzed files: {}", request.source_files.len());
    out.push('\n');

    for run in runs {
        if run.excluded() {
            let _ = writeln!(out, "{}", style(format!("{} excluded", run.name)).dim());
        } else {
            let _ = writeln!(out, "{}", style(format!(" --- {} ---", run.name)).bold());
            out.push_str(&run.result.log);
            out.push('\n');
        }
    }

    match overall {
        Some(score) => {
            let _ = writeln!(
                out,
                "{}",
                style(format!("Overall program Score: {:.1}/10", score)).bold()
            );
        }
        None => {
            let _ = writeln!(out, "No score available: every tool was excluded.");
        }
    }

    out
}

/// Build the machine-readable report.
pub fn build_report(
    runs: &[ToolRun],
    overall: Option<f64>,
    request: &AnalysisRequest,
) -> QualityReport {
    QualityReport {
        overall_score: overall,
        tools: runs
            .iter()
            .map(|run| ToolReport {
                name: run.name.to_string(),
                scores: run.result.scores.clone(),
                success: run.result.success,
            })
            .collect(),
        excluded: runs
            .iter()
            .filter(|run| run.excluded())
            .map(|run| run.name.to_string())
            .collect(),
        lines_of_code: request.lines_of_code,
        total_files: request.source_files.len(),
        generated_at: Local::now().to_rfc3339(),
    }
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &QualityReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// The badge markdown for a score.
pub fn badge_markdown(score: f64) -> String {
    format!(
        "[![Codegauge Score](https://img.shields.io/badge/codegauge-{:.1}-blue)](https://github.com/codegauge/codegauge)",
        score
    )
}

/// Insert the score badge at the top of `path`, or update an existing one
/// in place. A missing target file is created.
pub fn update_badge(path: &Path, score: f64) -> Result<()> {
    let badge = badge_markdown(score);
    let content = std::fs::read_to_string(path).unwrap_or_default();

    let existing = Regex::new(
        r"\[!\[Codegauge Score\]\(https://img\.shields\.io/badge/codegauge-[0-9.]+-blue\)\]\([^)]*\)",
    )
    .expect("static regex");

    let updated = if existing.is_match(&content) {
        existing.replace(&content, badge.as_str()).into_owned()
    } else if content.is_empty() {
        format!("{badge}\n")
    } else {
        format!("{badge}\n\n{content}")
    };

    std::fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))
}
