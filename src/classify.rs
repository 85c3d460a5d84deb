//! Warning severity classification
//!
//! Maps tool-specific warning identifiers onto severity weights 1-3:
//! 1 = could be fixed (style issues), 2 = should be fixed (might cause
//! problems or bugs), 3 = must be fixed (dangerous or highly bugprone).
//! Identifiers missing from a table weigh 1.
//!
//! The tables are immutable, versioned data passed explicitly into the
//! adapters. Changing an entry changes score comparability with earlier
//! runs, so edits bump the table version.

use crate::models::WarningRecord;

/// An immutable identifier -> severity-weight lookup table.
pub struct SeverityTable {
    pub version: &'static str,
    entries: &'static [(&'static str, u32)],
}

impl SeverityTable {
    pub const fn new(version: &'static str, entries: &'static [(&'static str, u32)]) -> Self {
        Self { version, entries }
    }

    /// Severity weight for an identifier; unknown identifiers weigh 1.
    pub fn weight(&self, identifier: &str) -> u32 {
        self.entries
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, w)| *w)
            .unwrap_or(1)
    }

    /// Build a classified record for one finding.
    pub fn record(&self, file: Option<String>, line: Option<u32>, category: &str) -> WarningRecord {
        WarningRecord {
            file,
            line,
            weight: self.weight(category),
            category: category.to_string(),
        }
    }
}

/// Sum of the per-finding severity weights.
pub fn weighted_count(records: &[WarningRecord]) -> u64 {
    records.iter().map(|r| r.weight as u64).sum()
}

/// Clang `-W...` diagnostic flags as emitted with `-Weverything`.
pub static COMPILER_WARNINGS: SeverityTable = SeverityTable::new(
    "2024.1",
    &[
        ("-Wabsolute-value", 3),
        ("-Wbad-function-cast", 3),
        ("-Wc11-extensions", 2),
        ("-Wc99-extensions", 1),
        ("-Wcast-align", 2),
        ("-Wcast-qual", 1),
        ("-Wchar-subscripts", 1),
        ("-Wcomma", 2),
        ("-Wcomment", 1),
        ("-Wconditional-uninitialized", 3),
        ("-Wconstant-conversion", 3),
        ("-Wconversion", 3),
        ("-Wcovered-switch-default", 1),
        ("-Wdate-time", 1),
        ("-Wdelete-non-virtual-dtor", 3),
        ("-Wdeprecated", 1),
        ("-Wdeprecated-declarations", 2),
        ("-Wdeprecated-dynamic-exception-spec", 1),
        ("-Wdeprecated-register", 1),
        ("-Wdocumentation", 1),
        ("-Wdocumentation-deprecated-sync", 1),
        ("-Wdocumentation-unknown-command", 1),
        ("-Wdouble-promotion", 2),
        ("-Wempty-body", 2),
        ("-Wexit-time-destructors", 1),
        ("-Wexpansion-to-defined", 2),
        ("-Wextra-semi", 1),
        ("-Wfloat-conversion", 3),
        ("-Wfloat-equal", 3),
        ("-Wfor-loop-analysis", 2),
        ("-Wformat", 2),
        ("-Wformat-extra-args", 2),
        ("-Wformat-nonliteral", 2),
        ("-Wformat-security", 3),
        ("-Wglobal-constructors", 1),
        ("-Wgnu-binary-literal", 2),
        ("-Wgnu-zero-variadic-macro-arguments", 1),
        ("-Wheader-hygiene", 3),
        ("-Wimplicit-fallthrough", 3),
        ("-Wimplicit-int", 2),
        ("-Wincompatible-library-redeclaration", 2),
        ("-Winfinite-recursion", 3),
        ("-Winvalid-source-encoding", 2),
        ("-Wlanguage-extension-token", 2),
        ("-Wliteral-conversion", 3),
        ("-Wlogical-not-parentheses", 2),
        ("-Wlogical-op-parentheses", 2),
        ("-Wmacro-redefined", 2),
        ("-Wmissing-declarations", 1),
        ("-Wmissing-noreturn", 1),
        ("-Wmissing-prototypes", 2),
        ("-Wmissing-variable-declarations", 2),
        ("-Wmultichar", 3),
        ("-Wnested-anon-types", 2),
        ("-Wnonnull", 2),
        ("-Wnon-virtual-dtor", 3),
        ("-Wnull-arithmetic", 3),
        ("-Wnull-conversion", 3),
        ("-Wold-style-cast", 1),
        ("-Woverlength-strings", 3),
        ("-Woverloaded-virtual", 1),
        ("-Wparentheses", 2),
        ("-Wparentheses-equality", 1),
        ("-Wpedantic", 2),
        ("-Wpointer-bool-conversion", 3),
        ("-Wpointer-sign", 3),
        ("-Wreorder", 1),
        ("-Wreserved-id-macro", 2),
        ("-Wreturn-type", 3),
        ("-Wself-assign", 3),
        ("-Wself-assign-field", 3),
        ("-Wself-assign-overloaded", 3),
        ("-Wself-move", 3),
        ("-Wshadow", 2),
        ("-Wshadow-field", 1),
        ("-Wshadow-field-in-constructor", 1),
        ("-Wshadow-field-in-constructor-modified", 1),
        ("-Wshift-sign-overflow", 3),
        ("-Wshorten-64-to-32", 3),
        ("-Wsign-compare", 3),
        ("-Wsign-conversion", 3),
        ("-Wsometimes-uninitialized", 3),
        ("-Wstatic-self-init", 3),
        ("-Wstring-plus-int", 3),
        ("-Wstrict-prototypes", 2),
        ("-Wstring-compare", 3),
        ("-Wstring-conversion", 3),
        ("-Wswitch-bool", 2),
        ("-Wswitch-enum", 2),
        ("-Wtautological-constant-compare", 3),
        ("-Wtautological-pointer-compare", 3),
        ("-Wtautological-type-limit-compare", 3),
        ("-Wtautological-unsigned-zero-compare", 3),
        ("-Wundef", 3),
        ("-Wundefined-func-template", 2),
        ("-Wuninitialized", 3),
        ("-Wunknown-pragmas", 1),
        ("-Wunreachable-code", 1),
        ("-Wunreachable-code-break", 2),
        ("-Wunreachable-code-loop-increment", 2),
        ("-Wunreachable-code-return", 2),
        ("-Wunused-exception-parameter", 1),
        ("-Wunused-function", 1),
        ("-Wunused-macros", 1),
        ("-Wunused-parameter", 2),
        ("-Wunused-private-field", 2),
        ("-Wunused-template", 1),
        ("-Wunused-value", 2),
        ("-Wunused-variable", 2),
        ("-Wused-but-marked-unused", 1),
        ("-Wvarargs", 1),
        ("-Wvector-conversion", 3),
        ("-Wvexing-parse", 2),
        ("-Wvla", 2),
        ("-Wvla-extension", 2),
        ("-Wweak-vtables", 1),
        ("-Wwritable-strings", 1),
        ("-Wzero-as-null-pointer-constant", 2),
    ],
);

/// Cppcheck message severities. Informational output carries no weight.
pub static CPPCHECK_WARNINGS: SeverityTable = SeverityTable::new(
    "2024.1",
    &[
        ("error", 3),
        ("warning", 3),
        ("style", 1),
        ("performance", 1),
        ("portability", 3),
        ("information", 0),
    ],
);

/// Clang-tidy check-name prefixes. "clang" covers clang-analyzer checks;
/// the category is everything before the first dash of the check name.
pub static CLANG_TIDY_WARNINGS: SeverityTable = SeverityTable::new(
    "2024.1",
    &[
        ("bugprone", 2),
        ("clang", 2),
        ("misc", 1),
        ("modernize", 1),
        ("mpi", 2),
        ("performance", 1),
        ("readability", 1),
        ("boost", 1),
        ("cppcoreguidelines", 1),
    ],
);

/// Infer report categories from the summary section of its bug report.
pub static INFER_WARNINGS: SeverityTable = SeverityTable::new(
    "2024.1",
    &[
        ("DEADLOCK", 2),
        ("DEAD_STORE", 1),
        ("EMPTY_VECTOR_ACCESS", 2),
        ("IMMUTABLE_CAST", 1),
        ("NULL_DEREFERENCE", 1),
        ("MEMORY_LEAK", 3),
        ("RESOURCE_LEAK", 2),
        ("UNINITIALIZED_VALUE", 1),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_identifiers() {
        assert_eq!(COMPILER_WARNINGS.weight("-Wconversion"), 3);
        assert_eq!(COMPILER_WARNINGS.weight("-Wold-style-cast"), 1);
        assert_eq!(CPPCHECK_WARNINGS.weight("portability"), 3);
        assert_eq!(CPPCHECK_WARNINGS.weight("information"), 0);
        assert_eq!(CLANG_TIDY_WARNINGS.weight("bugprone"), 2);
        assert_eq!(INFER_WARNINGS.weight("MEMORY_LEAK"), 3);
    }

    #[test]
    fn test_unknown_identifier_defaults_to_one() {
        assert_eq!(COMPILER_WARNINGS.weight("-Wno-such-warning"), 1);
        assert_eq!(CLANG_TIDY_WARNINGS.weight("altera"), 1);
    }

    #[test]
    fn test_classification_is_pure() {
        let records: Vec<_> = ["-Wconversion", "-Wshadow", "-Wvla", "unknown"]
            .iter()
            .map(|id| COMPILER_WARNINGS.record(None, None, id))
            .collect();

        let first = weighted_count(&records);
        let second = weighted_count(&records);
        assert_eq!(first, second);
        assert_eq!(first, 3 + 2 + 2 + 1);
    }

    #[test]
    fn test_record_carries_weight_and_category() {
        let record = CPPCHECK_WARNINGS.record(Some("a.c".into()), Some(7), "style");
        assert_eq!(record.weight, 1);
        assert_eq!(record.category, "style");
        assert_eq!(record.file.as_deref(), Some("a.c"));
        assert_eq!(record.line, Some(7));
    }
}
