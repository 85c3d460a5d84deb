//! Source discovery and line counting
//!
//! Supplies the analysis request inputs: the set of C/C++ source files
//! under the target tree and the lines-of-pure-code count (blank lines
//! and comment lines stripped).

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File extensions treated as C/C++ sources.
const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "h", "hpp"];

/// Directories that hold build output or analysis artifacts rather than
/// sources.
const EXCLUDED_DIR_NAMES: &[&str] = &[
    "build",
    "cmake-build-debug",
    "cmake-build-release",
    "compile",
    "infer-out",
    ".codegauge",
];

/// Recursively find all C/C++ source files under `program_dir`, honoring
/// .gitignore files and the run's exclusion set.
pub fn find_source_files(program_dir: &Path, excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkBuilder::new(program_dir).build() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().map_or(false, |t| t.is_file()) {
            continue;
        }
        if is_excluded(path, program_dir, excluded) {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if SOURCE_EXTENSIONS.contains(&ext) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("discovered {} source files", files.len());
    Ok(files)
}

fn is_excluded(path: &Path, program_dir: &Path, excluded: &[PathBuf]) -> bool {
    if excluded.iter().any(|ex| path.starts_with(ex)) {
        return true;
    }

    path.strip_prefix(program_dir)
        .map(|rel| {
            rel.components().any(|c| {
                matches!(c, Component::Normal(name)
                    if EXCLUDED_DIR_NAMES.contains(&name.to_string_lossy().as_ref()))
            })
        })
        .unwrap_or(false)
}

/// Read a source file, tolerating non-UTF-8 bytes (C sources regularly
/// carry latin-1 comments).
pub fn read_source(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Count the lines of pure code across `files`, ignoring blank lines and
/// comment lines.
pub fn count_lines_of_code(files: &[PathBuf]) -> Result<u64> {
    let mut total = 0;
    for file in files {
        total += count_lines_in_file(file)?;
    }
    Ok(total)
}

/// Count the lines of pure code in one file.
pub fn count_lines_in_file(path: &Path) -> Result<u64> {
    let content = read_source(path)?;
    let mut lines_of_code = 0;
    let mut in_block_comment = false;

    for line in content.lines() {
        let is_comment = line_is_comment(line, &mut in_block_comment);
        if is_comment || line.trim().is_empty() {
            continue;
        }
        lines_of_code += 1;
    }

    Ok(lines_of_code)
}

/// Whether `line` is entirely a comment, tracking block comments that span
/// lines. A line with trailing code after `*/` still counts as code.
fn line_is_comment(line: &str, in_block_comment: &mut bool) -> bool {
    let stripped = line.trim();

    if *in_block_comment {
        if let Some(end) = stripped.find("*/") {
            *in_block_comment = false;
            return stripped[end + 2..].trim().is_empty();
        }
        return true;
    }

    // One-line comments ("// foo" or "/* foo */")
    if stripped.starts_with("//") || (stripped.starts_with("/*") && stripped.ends_with("*/")) {
        return true;
    }

    // Start of a block comment
    if stripped.starts_with("/*") {
        *in_block_comment = true;
        return true;
    }

    false
}

/// Test-file heuristic: a "test" component in the path or a test-ish file
/// name prefix/suffix.
pub fn is_test_file(path: &Path) -> bool {
    let in_test_dir = path.components().any(|c| {
        matches!(c, Component::Normal(name) if {
            let name = name.to_string_lossy().to_lowercase();
            name == "test" || name == "tests" || name == "testing"
        })
    });
    if in_test_dir {
        return true;
    }

    path.file_stem()
        .map(|stem| {
            let stem = stem.to_string_lossy().to_lowercase();
            stem.starts_with("test_") || stem.ends_with("_test") || stem.ends_with("_tests")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_find_source_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.c", "int a;\n");
        write(dir.path(), "b.cpp", "int b;\n");
        write(dir.path(), "c.hpp", "int c;\n");
        write(dir.path(), "notes.txt", "not code\n");
        write(dir.path(), "build/generated.c", "int gen;\n");

        let files = find_source_files(dir.path(), &[]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.c", "b.cpp", "c.hpp"]);
    }

    #[test]
    fn test_find_source_files_honors_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep.c", "int keep;\n");
        let skipped = write(dir.path(), "vendor/skip.c", "int skip;\n");

        let files =
            find_source_files(dir.path(), &[skipped.parent().unwrap().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.c"));
    }

    #[test]
    fn test_loc_count_strips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            dir.path(),
            "a.c",
            "#include <stdio.h>\n\
             \n\
             // a comment line\n\
             /* one-line block */\n\
             /* multi\n\
                line\n\
                comment */\n\
             int main(void) {\n\
                 return 0; // trailing comment still counts as code\n\
             }\n",
        );

        assert_eq!(count_lines_in_file(&file).unwrap(), 4);
    }

    #[test]
    fn test_loc_count_code_after_block_end_counts() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(dir.path(), "a.c", "/* comment\n   more */ int x;\nint y;\n");
        assert_eq!(count_lines_in_file(&file).unwrap(), 2);
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(Path::new("/src/tests/check.c")));
        assert!(is_test_file(Path::new("/src/test_util.c")));
        assert!(is_test_file(Path::new("/src/util_test.cpp")));
        assert!(!is_test_file(Path::new("/src/contest.c")));
        assert!(!is_test_file(Path::new("/src/util.c")));
    }
}
