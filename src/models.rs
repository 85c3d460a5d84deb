//! Core data models for codegauge
//!
//! These models are shared by the tool adapters, the orchestration engine,
//! and the reporters.

use serde::Serialize;
use std::path::PathBuf;

/// Language of the analyzed codebase. Affects which checks and language
/// flags the tool adapters pass to their subprocesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    C,
    Cpp,
}

impl Language {
    pub fn is_cpp(self) -> bool {
        matches!(self, Language::Cpp)
    }
}

/// Everything the tool adapters need to know about one analysis run.
///
/// Built once by the CLI before orchestration starts and never mutated;
/// every adapter receives a shared reference. The compiler/sanitizer
/// fields are produced by whatever built and executed the program - this
/// tool does not drive the build itself.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Absolute path to the root of the program under analysis
    pub program_dir: PathBuf,
    /// All discovered C/C++ source files (absolute paths)
    pub source_files: Vec<PathBuf>,
    /// Lines of pure code (blank and comment lines stripped)
    pub lines_of_code: u64,
    /// Function count override; when absent, tools that need one parse it
    /// from their own output
    pub function_count: Option<u64>,
    pub language: Language,
    /// Paths excluded from analysis
    pub excluded_paths: Vec<PathBuf>,
    /// Project-specific assertion macro names counted next to assert()
    pub custom_asserts: Vec<String>,
    /// Pre-weighted compiler warning count from the build
    pub compiler_warnings: Option<f64>,
    /// Raw compiler output to classify, alternative to the pre-weighted count
    pub compiler_log: Option<PathBuf>,
    /// Captured sanitizer output from executing the instrumented program
    pub sanitizer_log: Option<PathBuf>,
    /// KWStyle rule configuration
    pub kwstyle_xml: Option<PathBuf>,
    /// Directory receiving the per-tool result artifacts
    pub output_dir: PathBuf,
    /// Per-tool timeout in seconds (0 = no timeout)
    pub tool_timeout: u64,
}

/// A single classified finding extracted from a tool's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningRecord {
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Tool-specific warning identifier (e.g. "-Wconversion", "bugprone")
    pub category: String,
    /// Severity weight 1-3
    pub weight: u32,
}

/// Result from running one analysis tool.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// One or more sub-scores in [0, 10]
    pub scores: Vec<f64>,
    /// Human-readable summary printed with the report
    pub log: String,
    /// False means the tool was excluded; its scores are zero placeholders
    /// and must not enter the composite
    pub success: bool,
}

impl ToolResult {
    pub fn ok(scores: Vec<f64>, log: String) -> Self {
        Self {
            scores,
            log,
            success: true,
        }
    }

    /// Placeholder result for a failed or excluded tool.
    pub fn failed(subscores: usize) -> Self {
        Self {
            scores: vec![0.0; subscores.max(1)],
            log: String::new(),
            success: false,
        }
    }
}

/// Per-tool entry of the machine-readable report.
#[derive(Debug, Clone, Serialize)]
pub struct ToolReport {
    pub name: String,
    pub scores: Vec<f64>,
    pub success: bool,
}

/// Machine-readable summary of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    /// Composite score over the surviving tools; absent when every tool
    /// was excluded
    pub overall_score: Option<f64>,
    pub tools: Vec<ToolReport>,
    /// Names of tools excluded from the composite
    pub excluded: Vec<String>,
    pub lines_of_code: u64,
    pub total_files: usize,
    pub generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_is_zeroed() {
        let result = ToolResult::failed(3);
        assert!(!result.success);
        assert_eq!(result.scores, vec![0.0, 0.0, 0.0]);
        assert!(result.log.is_empty());
    }

    #[test]
    fn test_failed_result_has_at_least_one_score() {
        let result = ToolResult::failed(0);
        assert_eq!(result.scores.len(), 1);
    }

    #[test]
    fn test_language_flag() {
        assert!(Language::Cpp.is_cpp());
        assert!(!Language::C.is_cpp());
        assert_eq!(Language::default(), Language::C);
    }
}
