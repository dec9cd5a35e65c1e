//! C Verify: static defect analysis for C source code.
//!
//! The crate scans C translation units for common defect patterns
//! (null pointer dereferences, memory leaks, uninitialized reads,
//! infinite loops, buffer overflows, missing returns), suggests fixes,
//! records findings in a SQLite history, and can train a classifier
//! from that history to score unseen code.

pub mod analysis;
pub mod api;
pub mod classify;
pub mod db;

pub use analysis::warnings::{BugKind, BugWarning, Severity};
pub use analysis::SourceAnalyzer;
pub use api::{AnalysisConfig, AnalysisReport, CVerify};

use anyhow::Result;

/// Analyze a source string with the default configuration.
pub fn analyze_source(file_name: &str, source: &str) -> Result<AnalysisReport> {
    CVerify::new().analyze_source(file_name, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_source_convenience() {
        let report = analyze_source("spin.c", "void spin() {\n    while (1) { }\n}\n")
            .expect("analyze");

        assert_eq!(report.file_name, "spin.c");
        assert!(report
            .findings
            .iter()
            .any(|f| f.kind == BugKind::InfiniteLoop));
    }
}
