//! Lizard complexity and duplication analysis
//!
//! One lizard run supplies three metrics: average cyclomatic complexity,
//! the rate of functions flagged as too complex (normalized by function
//! count, not lines), and the unique-code rate from the duplication
//! extension. Lizard exits 1 whenever it has warnings to report, so the
//! exit code is ignored and only the output matters.

use super::{artifact_line, process, write_artifact, AnalysisTool, ToolError};
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use std::fmt::Write as _;
use std::process::Command;

pub struct LizardTool;

/// Parsed lizard summary.
#[derive(Debug, Clone, PartialEq)]
struct LizardSummary {
    average_ccn: f64,
    warning_count: u64,
    function_count: u64,
    unique_rate: f64,
}

impl LizardTool {
    fn malformed(marker: &str) -> anyhow::Error {
        ToolError::MalformedOutput {
            tool: "lizard".to_string(),
            marker: marker.to_string(),
        }
        .into()
    }

    /// Pull the summary table and the duplication trailer out of the
    /// lizard output.
    fn parse_output(output: &str) -> Result<LizardSummary> {
        let lines: Vec<&str> = output.lines().collect();

        // The row two lines below the "Total nloc" header carries the
        // aggregate columns: nloc, avg nloc, avg ccn, avg token, function
        // count, warning count, ...
        let header_index = lines
            .iter()
            .position(|l| l.starts_with("Total nloc"))
            .ok_or_else(|| Self::malformed("Total nloc"))?;
        let summary_line = lines
            .get(header_index + 2)
            .ok_or_else(|| Self::malformed("summary row"))?;
        let fields: Vec<&str> = summary_line.split_whitespace().collect();

        let average_ccn: f64 = fields
            .get(2)
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| Self::malformed("average CCN column"))?;
        let function_count: u64 = fields
            .get(4)
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| Self::malformed("function count column"))?;
        let warning_count: u64 = fields
            .get(5)
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| Self::malformed("warning count column"))?;

        // -Eduplicate trailer: "Total unique rate: 87.66%"
        let unique_line = lines
            .iter()
            .rev()
            .find(|l| l.to_lowercase().contains("unique rate"))
            .ok_or_else(|| Self::malformed("unique rate"))?;
        let percentage = unique_line
            .split_whitespace()
            .last()
            .and_then(|token| token.strip_suffix('%'))
            .and_then(|token| token.parse::<f64>().ok())
            .ok_or_else(|| Self::malformed("unique rate percentage"))?;

        Ok(LizardSummary {
            average_ccn,
            warning_count,
            function_count,
            unique_rate: percentage / 100.0,
        })
    }
}

impl AnalysisTool for LizardTool {
    fn name(&self) -> &'static str {
        "Lizard"
    }

    fn key(&self) -> &'static str {
        "lizard"
    }

    fn subscore_count(&self) -> usize {
        3
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let mut cmd = Command::new("lizard");
        cmd.args(["-Eduplicate", "-l", "cpp"])
            .args(&request.source_files);

        let output = process::run_tool(self.key(), &mut cmd, None, request.tool_timeout)?;
        let summary = Self::parse_output(&output.merged)?;

        let functions = request
            .function_count
            .unwrap_or(summary.function_count);

        let ccn_score = Metric::CyclomaticComplexity.score(summary.average_ccn);
        let warning_rate = scoring::rate(summary.warning_count as f64, functions)?;
        let warning_score = Metric::LizardWarnings.score(warning_rate);
        let unique_score = Metric::Unique.score(summary.unique_rate);

        let path = write_artifact(request, self.key(), &output.merged)?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Average cyclomatic complexity: {}",
            summary.average_ccn
        );
        let _ = writeln!(
            log,
            "Lizard warning rate (~= rate of functions that are too complex): {} ({}/{})",
            warning_rate, summary.warning_count, functions
        );
        let _ = writeln!(log, "Unique code rate: {}", summary.unique_rate);
        let _ = writeln!(log, "{}", artifact_line(&path));
        log.push_str(&scoring::score_line("Cyclomatic complexity", ccn_score));
        log.push('\n');
        log.push_str(&scoring::score_line("Lizard warning", warning_score));
        log.push('\n');
        log.push_str(&scoring::score_line("Unique code", unique_score));
        log.push('\n');

        Ok(ToolResult::ok(
            vec![ccn_score, warning_score, unique_score],
            log,
        ))
    }
}
