//! KWStyle style checking
//!
//! KWStyle only behaves when given a single input file, so it is invoked
//! once per source file and the outputs are concatenated. Exit code 1 is
//! its normal "violations found" result.

use super::{artifact_line, process, write_artifact, AnalysisTool};
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use std::fmt::Write as _;
use std::process::Command;

pub struct KwStyleTool;

impl KwStyleTool {
    /// Violations are reported as lines starting with "Error".
    fn warning_count(output: &str) -> u64 {
        output
            .lines()
            .filter(|line| line.starts_with("Error"))
            .count() as u64
    }
}

impl AnalysisTool for KwStyleTool {
    fn name(&self) -> &'static str {
        "KWStyle"
    }

    fn key(&self) -> &'static str {
        "kwstyle"
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let mut output = String::new();

        for source_file in &request.source_files {
            let mut cmd = Command::new("KWStyle");
            cmd.arg("-v");
            if let Some(xml) = &request.kwstyle_xml {
                cmd.arg("-xml").arg(xml);
            }
            cmd.arg(source_file);

            let exec = process::run_tool(self.key(), &mut cmd, None, request.tool_timeout)?;
            output.push_str(&exec.merged);
            if !exec.merged.ends_with('\n') {
                output.push('\n');
            }
        }

        let warning_count = Self::warning_count(&output);
        let rate = scoring::rate(warning_count as f64, request.lines_of_code)?;
        let score = Metric::KwStyle.score(rate);

        let path = write_artifact(request, self.key(), &output)?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "KWStyle warning rate: {} ({}/{})",
            rate, warning_count, request.lines_of_code
        );
        let _ = writeln!(log, "{}", artifact_line(&path));
        log.push_str(&scoring::score_line(self.name(), score));
        log.push('\n');

        Ok(ToolResult::ok(vec![score], log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_count() {
        let output = "\
Processing src/a.c\n\
Error #1 (835) src/a.c line 12: line exceeds 100 characters\n\
Error #2 (233) src/a.c line 30: tabs are not allowed\n\
Processed 1 file\n";
        assert_eq!(KwStyleTool::warning_count(output), 2);
    }

    #[test]
    fn test_clean_output_has_no_warnings() {
        assert_eq!(KwStyleTool::warning_count("Processing src/a.c\n"), 0);
    }
}
