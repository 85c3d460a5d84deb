//! Analysis tool adapters
//!
//! Each external tool is wrapped in an adapter implementing
//! [`AnalysisTool`]: build the command line from the shared request,
//! interpret the typed process result (several tools exit nonzero merely
//! because they found something to report), extract and classify the
//! warning lines, normalize to a rate, score it with the calibrated
//! curve, and write the filtered findings to a result artifact.

mod assertions;
mod clang_tidy;
mod compiler;
mod cppcheck;
pub(crate) mod engine;
mod infer;
mod kwstyle;
mod lizard;
pub(crate) mod process;
mod test_count;

pub use engine::{run_guarded, Engine, ToolRun, DEFAULT_WORKERS};

use crate::models::{AnalysisRequest, ToolResult};
use anyhow::Result;
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for tool adapters.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} not found; install it or skip the tool")]
    NotInstalled { tool: String },

    #[error("{tool} crashed (exit code {code:?}, signal {signal:?})")]
    Crashed {
        tool: String,
        code: Option<i32>,
        signal: Option<i32>,
    },

    #[error("{tool} timed out after {seconds}s")]
    TimedOut { tool: String, seconds: u64 },

    #[error("expected report file {path} is missing")]
    MissingArtifact { path: String },

    #[error("{tool} output is missing the \"{marker}\" marker")]
    MalformedOutput { tool: String, marker: String },
}

/// Contract every analysis tool adapter implements.
///
/// Adapters are stateless: `execute` runs against the shared read-only
/// request and may block on its own subprocess. Failure isolation lives
/// in [`engine::run_guarded`], not in the adapters.
pub trait AnalysisTool: Send + Sync {
    /// Display name used in logs and score lines.
    fn name(&self) -> &'static str;

    /// Lower-case identifier used for `--skip-tool` and artifact names.
    fn key(&self) -> &'static str;

    /// Number of sub-scores this tool contributes. Determines the size of
    /// the zeroed placeholder when the tool is excluded.
    fn subscore_count(&self) -> usize {
        1
    }

    /// Whether the external prerequisite for this tool is present. Tools
    /// reporting false are excluded before dispatch.
    fn enabled(&self, request: &AnalysisRequest) -> bool {
        let _ = request;
        true
    }

    /// Run the tool to completion and produce its scores.
    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult>;
}

/// The fixed adapter registry, in report order.
pub fn registry() -> Vec<Box<dyn AnalysisTool>> {
    vec![
        Box::new(compiler::CompilerSanitizerTool),
        Box::new(assertions::AssertionTool),
        Box::new(cppcheck::CppcheckTool),
        Box::new(clang_tidy::ClangTidyTool),
        Box::new(lizard::LizardTool),
        Box::new(kwstyle::KwStyleTool),
        Box::new(infer::InferTool),
        Box::new(test_count::TestCountTool),
    ]
}

/// Write a tool's filtered findings next to the other run artifacts and
/// return the artifact path.
pub(crate) fn write_artifact(
    request: &AnalysisRequest,
    key: &str,
    content: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(&request.output_dir)?;
    let path = request.output_dir.join(format!("{key}_results.txt"));
    std::fs::write(&path, content)?;
    Ok(path)
}

/// `"Detailed results have been written into <path>"` log line.
pub(crate) fn artifact_line(path: &std::path::Path) -> String {
    format!("Detailed results have been written into {}", path.display())
}
