//! Cppcheck static analysis
//!
//! Runs cppcheck over the discovered sources (in argument chunks, since
//! huge file lists overflow the OS argument limit), pulls out the warning
//! lines, and weights them by their cppcheck severity category.

use super::{artifact_line, process, write_artifact, AnalysisTool, ToolError};
use crate::classify::{self, CPPCHECK_WARNINGS};
use crate::models::{AnalysisRequest, ToolResult, WarningRecord};
use crate::scoring::{self, Metric};
use anyhow::Result;
use regex::Regex;
use std::fmt::Write as _;
use std::process::Command;
use std::sync::OnceLock;

pub struct CppcheckTool;

/// Source files passed per cppcheck invocation.
const CHUNK_SIZE: usize = 1000;

fn severity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Both output dialects: "[file.c:4] (warning) msg" and
    // "file.c:4:7: warning: msg [id]"
    RE.get_or_init(|| {
        Regex::new(r"\((error|warning|style|performance|portability|information)\)|\b(error|warning|style|performance|portability|information):")
            .expect("static regex")
    })
}

impl CppcheckTool {
    /// Informative lines carry a bracketed location.
    fn warning_lines(output: &str) -> Vec<&str> {
        output.lines().filter(|line| line.contains('[')).collect()
    }

    fn classify_lines(lines: &[&str]) -> Vec<WarningRecord> {
        let mut records = Vec::new();
        for line in lines {
            let Some(captures) = severity_re().captures(line) else {
                continue;
            };
            let severity = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str())
                .unwrap_or("information");

            let file = line
                .split(&[':', ']'][..])
                .next()
                .map(|s| s.trim_start_matches('[').to_string())
                .filter(|s| s.contains('.'));

            records.push(CPPCHECK_WARNINGS.record(file, None, severity));
        }
        records
    }
}

impl AnalysisTool for CppcheckTool {
    fn name(&self) -> &'static str {
        "Cppcheck"
    }

    fn key(&self) -> &'static str {
        "cppcheck"
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let language = if request.language.is_cpp() { "c++" } else { "c" };

        let mut output = String::new();
        for chunk in request.source_files.chunks(CHUNK_SIZE) {
            let mut cmd = Command::new("cppcheck");
            cmd.args(["--enable=all", "--force", "-v"])
                .arg(format!("--language={language}"))
                .args(chunk);

            let exec = process::run_tool(self.key(), &mut cmd, None, request.tool_timeout)?;
            // cppcheck reports findings on exit 0; a nonzero exit is a
            // usage or internal error, not "issues found"
            if exec.code != Some(0) {
                return Err(ToolError::Crashed {
                    tool: self.key().to_string(),
                    code: exec.code,
                    signal: exec.signal,
                }
                .into());
            }
            output.push_str(&exec.merged);
            output.push('\n');
        }

        let warning_lines = Self::warning_lines(&output);
        let records = Self::classify_lines(&warning_lines);
        let weighted = classify::weighted_count(&records);
        let rate = scoring::rate(weighted as f64, request.lines_of_code)?;
        let score = Metric::Cppcheck.score(rate);

        let path = write_artifact(request, self.key(), &warning_lines.join("\n"))?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Total weighted Cppcheck warning rate: {} ({}/{})",
            rate, weighted, request.lines_of_code
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
    fn test_warning_lines_need_a_bracket() {
        let output = "\
Checking src/a.c ...\n\
src/a.c:10:5: error: Array index out of bounds [arrayIndexOutOfBounds]\n\
1/2 files checked 50% done\n\
[src/b.c:3] (style) The scope of the variable can be reduced\n";

        let lines = CppcheckTool::warning_lines(output);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_classification_weights_by_severity() {
        let lines = vec![
            "src/a.c:10:5: error: Array index out of bounds [arrayIndexOutOfBounds]",
            "[src/b.c:3] (style) The scope of the variable can be reduced",
            "[src/b.c:9] (portability) Casting between pointer types",
        ];

        let records = CppcheckTool::classify_lines(&lines);
        assert_eq!(records.len(), 3);
        assert_eq!(classify::weighted_count(&records), 3 + 1 + 3);
        assert_eq!(records[0].file.as_deref(), Some("src/a.c"));
        assert_eq!(records[1].file.as_deref(), Some("src/b.c"));
    }

    #[test]
    fn test_information_lines_carry_no_weight() {
        let lines =
            vec!["[src/a.c:1] (information) Include file not found: missing.h"];
        let records = CppcheckTool::classify_lines(&lines);
        assert_eq!(classify::weighted_count(&records), 0);
    }
}
