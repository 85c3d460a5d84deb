//! Compiler and sanitizer scoring
//!
//! Compilation and execution happen outside this tool: whatever built the
//! program supplies either a raw compiler log or an already-weighted
//! warning count, and optionally the sanitizer output captured while
//! running the instrumented binary. This adapter classifies those inputs
//! and folds them into one score over the lines of code.

use super::{artifact_line, write_artifact, AnalysisTool, ToolError};
use crate::classify::{self, COMPILER_WARNINGS};
use crate::models::{AnalysisRequest, ToolResult, WarningRecord};
use crate::scoring::{self, Metric};
use anyhow::Result;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::OnceLock;

pub struct CompilerSanitizerTool;

/// Sanitizer errors always land in the must-fix class.
const SANITIZER_WEIGHT: u64 = 3;

fn ubsan_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.(c|cc|cpp|cxx|h|hpp):\d+:\d+:\s+runtime error:").expect("static regex")
    })
}

impl CompilerSanitizerTool {
    /// Extract the `[-Wfoo]` trailers from compiler warning lines and
    /// classify them. Notes and code excerpts carry no trailer and are
    /// skipped.
    fn classify_compiler_log(log: &str) -> Vec<WarningRecord> {
        let mut records = Vec::new();
        for line in log.lines() {
            let Some(last) = line.split_whitespace().last() else {
                continue;
            };
            if last.starts_with("[-W") && last.ends_with(']') {
                records.push(COMPILER_WARNINGS.record(None, None, &last[1..last.len() - 1]));
            }
        }
        records
    }

    /// Count AddressSanitizer and UndefinedBehaviorSanitizer errors in a
    /// captured sanitizer log.
    fn sanitizer_counts(log: &str) -> (u64, u64) {
        let mut asan = 0;
        let mut ubsan = 0;
        for line in log.lines() {
            if line.starts_with("==") && line.contains("ERROR") {
                asan += 1;
            }
            if ubsan_line_re().is_match(line) {
                ubsan += 1;
            }
        }
        (asan, ubsan)
    }

    fn read_input(path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ToolError::MissingArtifact {
                path: path.display().to_string(),
            }
            .into());
        }
        crate::discovery::read_source(path)
    }
}

impl AnalysisTool for CompilerSanitizerTool {
    fn name(&self) -> &'static str {
        "Compiler & Sanitizer"
    }

    fn key(&self) -> &'static str {
        "compiler"
    }

    /// Without any build output there is nothing to score.
    fn enabled(&self, request: &AnalysisRequest) -> bool {
        request.compiler_warnings.is_some()
            || request.compiler_log.is_some()
            || request.sanitizer_log.is_some()
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let loc = request.lines_of_code;
        let mut artifact = String::new();
        let mut log = String::new();

        let mut compiler_weighted = request.compiler_warnings.unwrap_or(0.0);
        if let Some(path) = &request.compiler_log {
            let content = Self::read_input(path)?;
            let records = Self::classify_compiler_log(&content);
            compiler_weighted += classify::weighted_count(&records) as f64;
            for record in &records {
                let _ = writeln!(artifact, "{} (weight {})", record.category, record.weight);
            }
        }

        let compiler_rate = scoring::rate(compiler_weighted, loc)?;
        let _ = writeln!(
            log,
            "Weighted compiler warning rate: {} ({}/{})",
            compiler_rate, compiler_weighted, loc
        );

        let mut sanitizer_weighted = 0;
        if let Some(path) = &request.sanitizer_log {
            let content = Self::read_input(path)?;
            let (asan, ubsan) = Self::sanitizer_counts(&content);
            sanitizer_weighted = SANITIZER_WEIGHT * (asan + ubsan);

            let _ = writeln!(
                log,
                "AddressSanitizer error rate: {} ({}/{})",
                scoring::rate(asan as f64, loc)?,
                asan,
                loc
            );
            let _ = writeln!(
                log,
                "UndefinedBehaviorSanitizer error rate: {} ({}/{})",
                scoring::rate(ubsan as f64, loc)?,
                ubsan,
                loc
            );
            artifact.push_str(&content);
        }

        let total_rate = scoring::rate(compiler_weighted + sanitizer_weighted as f64, loc)?;
        let score = Metric::CompilerAndSanitizer.score(total_rate);

        let path = write_artifact(request, self.key(), &artifact)?;
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
    fn test_compiler_log_classification() {
        let log = "\
src/a.c:3:9: warning: implicit conversion loses integer precision [-Wconversion]\n\
  int x = y;\n\
      ~   ^\n\
src/a.c:9:1: warning: variable 'z' shadows a local [-Wshadow]\n\
src/a.c:12:4: note: previous declaration is here\n";

        let records = CompilerSanitizerTool::classify_compiler_log(log);
        assert_eq!(records.len(), 2);
        assert_eq!(classify::weighted_count(&records), 3 + 2);
    }

    #[test]
    fn test_sanitizer_counts() {
        let log = "\
==1234==ERROR: AddressSanitizer: heap-buffer-overflow on address 0x999\n\
READ of size 4 at 0x999\n\
src/b.c:42:7: runtime error: signed integer overflow\n\
src/b.c:50:3: runtime error: null pointer passed as argument\n\
==1234==ABORTING\n";

        let (asan, ubsan) = CompilerSanitizerTool::sanitizer_counts(log);
        assert_eq!(asan, 1);
        assert_eq!(ubsan, 2);
    }

    #[test]
    fn test_disabled_without_build_inputs() {
        let request = AnalysisRequest::default();
        assert!(!CompilerSanitizerTool.enabled(&request));

        let with_count = AnalysisRequest {
            compiler_warnings: Some(12.0),
            ..Default::default()
        };
        assert!(CompilerSanitizerTool.enabled(&with_count));
    }

    #[test]
    fn test_execute_scores_pre_weighted_count() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalysisRequest {
            compiler_warnings: Some(0.0),
            lines_of_code: 1000,
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let result = CompilerSanitizerTool.execute(&request).unwrap();
        assert!(result.success);
        // Zero warnings sit on the pinned best end of the curve
        assert_eq!(result.scores, vec![10.0]);
        assert!(result
            .log
            .contains("Weighted compiler warning rate: 0 (0/1000)"));
        assert!(dir.path().join("compiler_results.txt").exists());
    }

    #[test]
    fn test_missing_log_file_is_a_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalysisRequest {
            compiler_log: Some(dir.path().join("nope.log")),
            lines_of_code: 100,
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = CompilerSanitizerTool.execute(&request).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ToolError>(),
            Some(ToolError::MissingArtifact { .. })
        ));
    }
}
