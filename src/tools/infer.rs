//! Infer deep static analysis
//!
//! Infer needs the program compiled under its capture wrapper before it
//! can analyze anything; that capture step belongs to whatever drives the
//! build. When an `infer-out/` directory is present this adapter runs the
//! analysis phase over it and weights the categories from the report
//! summary.

use super::{artifact_line, process, write_artifact, AnalysisTool, ToolError};
use crate::classify::INFER_WARNINGS;
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use std::fmt::Write as _;
use std::process::Command;

pub struct InferTool;

const OUTPUT_DIR_NAME: &str = "infer-out";
const REPORT_FILE_NAME: &str = "bugs.txt";

impl InferTool {
    /// Weight the category counts from the "Summary of the reports"
    /// section, e.g. "  NULL_DEREFERENCE: 3".
    fn weighted_count(report: &str) -> u64 {
        let mut weighted = 0;
        let mut recording = false;

        for line in report.lines() {
            if line.contains("Summary of the reports") {
                recording = true;
                continue;
            }
            if !recording || line.trim().is_empty() {
                continue;
            }

            let compact = line.replace(' ', "");
            let mut parts = compact.split(':');
            let (Some(category), Some(count)) = (parts.next(), parts.next_back()) else {
                continue;
            };
            if category.is_empty() {
                continue;
            }
            let Ok(count) = count.parse::<u64>() else {
                continue;
            };
            weighted += INFER_WARNINGS.weight(category) as u64 * count;
        }

        weighted
    }
}

impl AnalysisTool for InferTool {
    fn name(&self) -> &'static str {
        "Infer"
    }

    fn key(&self) -> &'static str {
        "infer"
    }

    /// Without a capture directory the analysis phase has nothing to work
    /// on; the build collaborator produces it.
    fn enabled(&self, request: &AnalysisRequest) -> bool {
        request.program_dir.join(OUTPUT_DIR_NAME).exists()
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let mut cmd = Command::new("infer");
        cmd.args(["analyze", "--keep-going"]);
        let exec = process::run_tool(
            self.key(),
            &mut cmd,
            Some(&request.program_dir),
            request.tool_timeout,
        )?;
        if exec.code != Some(0) {
            return Err(ToolError::Crashed {
                tool: self.key().to_string(),
                code: exec.code,
                signal: exec.signal,
            }
            .into());
        }

        let report_path = request
            .program_dir
            .join(OUTPUT_DIR_NAME)
            .join(REPORT_FILE_NAME);
        if !report_path.exists() {
            return Err(ToolError::MissingArtifact {
                path: report_path.display().to_string(),
            }
            .into());
        }
        let report = crate::discovery::read_source(&report_path)?;

        let weighted = Self::weighted_count(&report);
        let rate = scoring::rate(weighted as f64, request.lines_of_code)?;
        let score = Metric::Infer.score(rate);

        let path = write_artifact(request, self.key(), &report)?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Weighted Infer warning rate: {} ({}/{})",
            rate, weighted, request.lines_of_code
        );
        let _ = writeln!(log, "{}", artifact_line(&path));
        log.push_str(&scoring::score_line(self.name(), score));
        log.push('\n');

        Ok(ToolResult::ok(vec![score], log))
    }
}
