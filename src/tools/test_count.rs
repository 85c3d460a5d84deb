//! Test code share
//!
//! Measures how much of the codebase is test code: the lines of pure code
//! in test files over the total. Purely file-based, no subprocess.

use super::{artifact_line, write_artifact, AnalysisTool};
use crate::discovery;
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use std::fmt::Write as _;

pub struct TestCountTool;

impl AnalysisTool for TestCountTool {
    fn name(&self) -> &'static str {
        "Test count"
    }

    fn key(&self) -> &'static str {
        "test-count"
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let test_files: Vec<_> = request
            .source_files
            .iter()
            .filter(|f| discovery::is_test_file(f))
            .cloned()
            .collect();
        let test_loc = discovery::count_lines_of_code(&test_files)?;

        let loc = request.lines_of_code;
        let rate = scoring::rate(test_loc as f64, loc)?;
        let score = Metric::TestCount.score(rate);

        let mut artifact = String::new();
        let _ = writeln!(artifact, "Test files ({}):", test_files.len());
        for file in &test_files {
            let _ = writeln!(artifact, "{}", file.display());
        }
        let path = write_artifact(request, self.key(), &artifact)?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Test LOC rate: {} ({}/{})",
            rate, test_loc, loc
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
    use std::fs;

    #[test]
    fn test_rate_over_test_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("core.c");
        fs::write(&src, "int a;\nint b;\nint c;\n").unwrap();
        let test_dir = dir.path().join("tests");
        fs::create_dir(&test_dir).unwrap();
        let test = test_dir.join("core_test.c");
        fs::write(&test, "int check;\n").unwrap();

        let request = AnalysisRequest {
            source_files: vec![src, test],
            lines_of_code: 4,
            output_dir: dir.path().join("out"),
            ..Default::default()
        };

        let result = TestCountTool.execute(&request).unwrap();
        assert!(result.success);
        assert!(result.log.contains("Test LOC rate: 0.25 (1/4)"));
    }

    #[test]
    fn test_no_test_files_scores_zero() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("core.c");
        fs::write(&src, "int a;\n").unwrap();

        let request = AnalysisRequest {
            source_files: vec![src],
            lines_of_code: 1,
            output_dir: dir.path().join("out"),
            ..Default::default()
        };

        let result = TestCountTool.execute(&request).unwrap();
        // Zero test code sits on the pinned worst end of the curve
        assert_eq!(result.scores, vec![0.0]);
    }
}
