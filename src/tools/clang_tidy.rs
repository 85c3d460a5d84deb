//! Clang-tidy analysis
//!
//! Extracts the warning block between the "N warnings generated." header
//! and the "Suppressed M warnings" trailer, weights each diagnostic by
//! its check category, and scores the weighted rate over the lines of
//! code.
//!
//! clang-tidy occasionally segfaults on code it should handle; the run is
//! retried a bounded number of times before giving up on the tool.

use super::{artifact_line, process, write_artifact, AnalysisTool, ToolError};
use crate::classify::CLANG_TIDY_WARNINGS;
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use regex::Regex;
use std::fmt::Write as _;
use std::process::Command;
use std::sync::OnceLock;

pub struct ClangTidyTool;

const DEFAULT_TRIES: i32 = 5;

const CHECKS_C: &str = "-*,bugprone-*,clang-analyzer-*,misc-*,modernize-*,mpi-*,performance-*,\
                        readability-*,-readability-non-const-parameter,-clang-analyzer-cp*,\
                        -clang-analyzer-unix.MismatchedDeallocator";
const CHECKS_CPP_EXTRA: &str = ",boost-*,cppcoreguidelines-*";

fn warning_location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Diagnostic lines start with "path/file.cpp:line:col:"
    RE.get_or_init(|| Regex::new(r".+\.(c|cc|cpp|cxx|h|hpp):\d+:\d+:").expect("static regex"))
}

impl ClangTidyTool {
    fn is_header_line(line: &str) -> bool {
        line.trim_end().ends_with("generated.")
    }

    fn is_trailer_line(line: &str) -> bool {
        line.starts_with("Suppressed")
    }

    /// The warning block sits between the header and trailer markers.
    fn warning_lines(output: &str) -> Vec<&str> {
        let mut lines = Vec::new();
        let mut recording = false;

        for line in output.lines() {
            if Self::is_header_line(line) {
                recording = true;
            }
            if recording {
                lines.push(line);
            }
            if Self::is_trailer_line(line) {
                recording = false;
            }
        }

        lines
    }

    /// Weight each diagnostic line by the category prefix of its trailing
    /// `[category-check-name]` tag. Notes and code excerpts have no tag.
    fn weighted_count(warning_lines: &[&str]) -> u64 {
        let mut weighted = 0;

        for line in warning_lines {
            if !warning_location_re().is_match(line) {
                continue;
            }
            let Some(last) = line.split_whitespace().last() else {
                continue;
            };
            if !(last.starts_with('[') && last.ends_with(']')) {
                continue;
            }
            let check = &last[1..last.len() - 1];
            let category = check.split('-').next().unwrap_or(check);
            weighted += CLANG_TIDY_WARNINGS.weight(category) as u64;
        }

        weighted
    }

    /// Drop the header/trailer markers for the artifact.
    fn beautify(warning_lines: &[&str]) -> String {
        warning_lines
            .iter()
            .filter(|l| !Self::is_header_line(l) && !Self::is_trailer_line(l))
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AnalysisTool for ClangTidyTool {
    fn name(&self) -> &'static str {
        "Clang-tidy"
    }

    fn key(&self) -> &'static str {
        "clang-tidy"
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let mut checks = String::from(CHECKS_C);
        if request.language.is_cpp() {
            checks.push_str(CHECKS_CPP_EXTRA);
        }

        let output = process::run_with_retries(self.key(), DEFAULT_TRIES, || {
            let mut cmd = Command::new("clang-tidy");
            cmd.args(&request.source_files)
                .arg(format!("-checks={checks}"))
                .arg("-p")
                .arg(&request.program_dir);
            process::run_tool(self.key(), &mut cmd, None, request.tool_timeout)
        })?;
        // A nonzero exit without a signal usually means "no compilation
        // database"; the diagnostics are still on the output.

        if output.merged.trim().is_empty() {
            return Err(ToolError::MalformedOutput {
                tool: self.key().to_string(),
                marker: "warnings generated".to_string(),
            }
            .into());
        }

        let warning_lines = Self::warning_lines(&output.merged);
        let weighted = Self::weighted_count(&warning_lines);
        let rate = scoring::rate(weighted as f64, request.lines_of_code)?;
        let score = Metric::ClangTidy.score(rate);

        let path = write_artifact(request, self.key(), &Self::beautify(&warning_lines))?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Weighted Clang-tidy warning rate: {} ({}/{})",
            rate, weighted, request.lines_of_code
        );
        let _ = writeln!(log, "{}", artifact_line(&path));
        log.push_str(&scoring::score_line(self.name(), score));
        log.push('\n');

        Ok(ToolResult::ok(vec![score], log))
    }
}
