//! Assertion usage analysis
//!
//! No subprocess here: every source file is scanned line by line for
//! `assert(` / `static_assert(` calls plus any project-specific assertion
//! macros from the request. Matches inside `//` and `/* ... */` comments
//! do not count; block comments are tracked across lines. A literal
//! "assert(" inside a string still matches, which is acceptable noise.

use super::{artifact_line, write_artifact, AnalysisTool};
use crate::discovery;
use crate::models::{AnalysisRequest, ToolResult};
use crate::scoring::{self, Metric};
use anyhow::Result;
use regex::Regex;
use std::fmt::Write as _;
use std::path::Path;

pub struct AssertionTool;

impl AssertionTool {
    /// Pattern matching an assertion call at a code position: assert or
    /// static_assert or any custom name, followed by an opening paren.
    fn pattern(custom_asserts: &[String]) -> Result<Regex> {
        let mut names = String::from("(static_)?assert");
        for name in custom_asserts {
            names.push('|');
            names.push_str(&regex::escape(name));
        }
        Ok(Regex::new(&format!(r"(\W|^)({names})\s*\("))?)
    }

    /// Count assertion calls in one file, skipping commented code.
    fn count_in_file(re: &Regex, path: &Path) -> Result<u64> {
        let content = discovery::read_source(path)?;
        let mut count = 0;
        let mut in_block_comment = false;

        for line in content.lines() {
            let code = strip_comments(line, &mut in_block_comment);
            if re.is_match(&code) {
                count += 1;
            }
        }

        Ok(count)
    }
}

/// Remove `//` and `/* ... */` regions from one line, carrying the open
/// block-comment state across calls.
fn strip_comments(line: &str, in_block_comment: &mut bool) -> String {
    let bytes = line.as_bytes();
    let mut code = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if *in_block_comment {
            if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                *in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if bytes[i] == b'/' {
            match bytes.get(i + 1) {
                // Rest of the line is a comment
                Some(b'/') => break,
                Some(b'*') => {
                    *in_block_comment = true;
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }

        code.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&code).into_owned()
}

impl AnalysisTool for AssertionTool {
    fn name(&self) -> &'static str {
        "Assertion"
    }

    fn key(&self) -> &'static str {
        "assertions"
    }

    fn execute(&self, request: &AnalysisRequest) -> Result<ToolResult> {
        let re = Self::pattern(&request.custom_asserts)?;

        let mut assert_count = 0;
        for file in &request.source_files {
            assert_count += Self::count_in_file(&re, file)?;
        }

        let loc = request.lines_of_code;
        let assertion_rate = scoring::rate(assert_count as f64, loc)?;
        let score = Metric::Assertions.score(assertion_rate);

        let mut artifact = String::new();
        let _ = writeln!(
            artifact,
            "Found {} assertions in {} lines of pure code (i.e. excluding blank lines and comment lines).",
            assert_count, loc
        );
        let _ = writeln!(
            artifact,
            "That's an assertion rate of {}, or {}%.",
            assertion_rate,
            100.0 * assertion_rate
        );
        let path = write_artifact(request, self.key(), &artifact)?;

        let mut log = String::new();
        let _ = writeln!(
            log,
            "Assertion rate: {} ({}/{})",
            assertion_rate, assert_count, loc
        );
        let _ = writeln!(log, "{}", artifact_line(&path));
        log.push_str(&scoring::score_line(self.name(), score));
        log.push('\n');

        Ok(ToolResult::ok(vec![score], log))
    }
}
