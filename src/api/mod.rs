// C Verify API
//
// This module provides the main entry point for analyzing C source code
// and producing reports.

pub mod config;
pub mod report;
pub mod types;

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use log::info;

use crate::analysis::fixes::{suggest_fix, FixSuggestion};
use crate::analysis::warnings::{BugKind, BugWarning};
use crate::analysis::{
    analyzer_buffer_overflow, analyzer_infinite_loop, analyzer_memory_leak,
    analyzer_missing_return, analyzer_null_pointer, analyzer_uninitialized, SourceAnalyzer,
};
use crate::db::BugStore;

pub use config::{ConfigBuilder, ConfigManager};
pub use report::{ReportFormat, ReportFormatter};
pub use types::{AnalysisConfig, AnalysisReport, Finding, FindingLocation, FindingSeverity};

/// Main analyzer facade for C Verify
pub struct CVerify {
    config: AnalysisConfig,
}

impl Default for CVerify {
    fn default() -> Self {
        Self::new()
    }
}

impl CVerify {
    /// Create an analyzer with the default configuration.
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// Create an analyzer with a custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze source text and produce a full report.
    pub fn analyze_source(&self, file_name: &str, source: &str) -> Result<AnalysisReport> {
        let analyzer = SourceAnalyzer::new(file_name, source);
        let warnings = self.collect_warnings(&analyzer);

        info!(
            "analyzed {}: {} functions, {} warnings",
            file_name,
            analyzer.functions().len(),
            warnings.len()
        );

        Ok(self.build_report(&analyzer, warnings))
    }

    /// Analyze a file on disk and produce a full report.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<AnalysisReport> {
        let analyzer = SourceAnalyzer::from_file(path)?;
        let warnings = self.collect_warnings(&analyzer);
        Ok(self.build_report(&analyzer, warnings))
    }

    /// Analyze only for null pointer dereferences.
    pub fn analyze_null_pointers(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_null_pointer {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_null_pointer::detect_null_dereferences(&analyzer))
    }

    /// Analyze only for memory leaks.
    pub fn analyze_memory_leaks(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_memory_leak {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_memory_leak::detect_memory_leaks(&analyzer))
    }

    /// Analyze only for uninitialized variable reads.
    pub fn analyze_uninitialized(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_uninitialized {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_uninitialized::detect_uninitialized_reads(&analyzer))
    }

    /// Analyze only for infinite loops.
    pub fn analyze_infinite_loops(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_infinite_loop {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_infinite_loop::detect_infinite_loops(&analyzer))
    }

    /// Analyze only for buffer overflows.
    pub fn analyze_buffer_overflows(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_buffer_overflow {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_buffer_overflow::detect_buffer_overflows(&analyzer))
    }

    /// Analyze only for missing return statements.
    pub fn analyze_missing_returns(&self, source: &str) -> Result<Vec<BugWarning>> {
        if !self.config.detect_missing_return {
            return Ok(Vec::new());
        }
        let analyzer = SourceAnalyzer::new("<memory>", source);
        Ok(analyzer_missing_return::detect_missing_returns(&analyzer))
    }

    /// Suggest fixes for every warning found in the source.
    pub fn suggest_fixes(&self, source: &str) -> Result<Vec<FixSuggestion>> {
        let analyzer = SourceAnalyzer::new("<memory>", source);
        let warnings = self.collect_warnings(&analyzer);
        Ok(warnings
            .iter()
            .filter_map(|w| suggest_fix(w, source))
            .collect())
    }

    /// Analyze a file and persist the sample, its bugs and suggested
    /// fixes into the history store.
    pub fn analyze_and_record<P: AsRef<Path>>(
        &self,
        store: &BugStore,
        path: P,
    ) -> Result<AnalysisReport> {
        let analyzer = SourceAnalyzer::from_file(path)?;
        let warnings = self.collect_warnings(&analyzer);

        let sample_id = store.add_code_sample(
            analyzer.file_name(),
            analyzer.source(),
            !warnings.is_empty(),
        )?;
        for warning in &warnings {
            let bug_id = store.add_bug(sample_id, warning)?;
            if let Some(fix) = suggest_fix(warning, analyzer.source()) {
                store.add_fix(bug_id, &fix.replacement, &fix.description)?;
            }
        }

        info!(
            "recorded {} as sample {} with {} bugs",
            analyzer.file_name(),
            sample_id,
            warnings.len()
        );

        Ok(self.build_report(&analyzer, warnings))
    }

    /// Run every enabled detector over a scanned source.
    fn collect_warnings(&self, analyzer: &SourceAnalyzer) -> Vec<BugWarning> {
        let mut warnings = analyzer.scan_warnings().to_vec();

        if self.config.detect_null_pointer {
            warnings.extend(analyzer_null_pointer::detect_null_dereferences(analyzer));
        }
        if self.config.detect_memory_leak {
            warnings.extend(analyzer_memory_leak::detect_memory_leaks(analyzer));
        }
        if self.config.detect_uninitialized {
            warnings.extend(analyzer_uninitialized::detect_uninitialized_reads(analyzer));
        }
        if self.config.detect_infinite_loop {
            warnings.extend(analyzer_infinite_loop::detect_infinite_loops(analyzer));
        }
        if self.config.detect_buffer_overflow {
            warnings.extend(analyzer_buffer_overflow::detect_buffer_overflows(analyzer));
        }
        if self.config.detect_missing_return {
            warnings.extend(analyzer_missing_return::detect_missing_returns(analyzer));
        }

        warnings.sort_by_key(|w| w.line);
        warnings
    }

    fn build_report(&self, analyzer: &SourceAnalyzer, warnings: Vec<BugWarning>) -> AnalysisReport {
        let findings = warnings
            .into_iter()
            .map(|warning| Finding {
                title: finding_title(&warning.kind),
                description: warning.description,
                severity: warning.severity.into(),
                kind: warning.kind,
                location: if warning.line > 0 {
                    FindingLocation::Line(warning.line)
                } else if let Some(function) = warning.function {
                    FindingLocation::Function(function)
                } else {
                    FindingLocation::Unknown
                },
                recommendation: warning.remediation,
            })
            .collect();

        AnalysisReport {
            timestamp: Utc::now(),
            file_name: analyzer.file_name().to_string(),
            source_lines: analyzer.line_count(),
            functions_analyzed: analyzer.functions().len(),
            findings,
            analysis_config: self.config.clone(),
        }
    }
}

fn finding_title(kind: &BugKind) -> String {
    match kind {
        BugKind::NullPointerDereference => "Null Pointer Dereference".to_string(),
        BugKind::MemoryLeak => "Memory Leak".to_string(),
        BugKind::UninitializedVariable => "Uninitialized Variable".to_string(),
        BugKind::InfiniteLoop => "Infinite Loop".to_string(),
        BugKind::BufferOverflow => "Buffer Overflow".to_string(),
        BugKind::MissingReturn => "Missing Return".to_string(),
        BugKind::SyntaxError => "Syntax Error".to_string(),
        BugKind::Other(name) => name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAKY: &str = r#"
void leak() {
    int* p = malloc(sizeof(int));
    *p = 1;
}
"#;

    #[test]
    fn test_analyze_source_reports_findings() {
        let verifier = CVerify::new();
        let report = verifier.analyze_source("leak.c", LEAKY).expect("analyze");

        assert_eq!(report.file_name, "leak.c");
        assert!(report
            .findings
            .iter()
            .any(|f| f.kind == BugKind::MemoryLeak));
    }

    #[test]
    fn test_disabled_detector_is_skipped() {
        let config = ConfigManager::builder().detect_memory_leak(false).build();
        let verifier = CVerify::with_config(config);

        let report = verifier.analyze_source("leak.c", LEAKY).expect("analyze");
        assert!(!report
            .findings
            .iter()
            .any(|f| f.kind == BugKind::MemoryLeak));

        let direct = verifier.analyze_memory_leaks(LEAKY).expect("analyze");
        assert!(direct.is_empty());
    }

    #[test]
    fn test_targeted_analysis() {
        let verifier = CVerify::new();
        let warnings = verifier.analyze_memory_leaks(LEAKY).expect("analyze");

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, BugKind::MemoryLeak);
    }

    #[test]
    fn test_suggest_fixes() {
        let verifier = CVerify::new();
        let fixes = verifier.suggest_fixes(LEAKY).expect("fixes");

        assert!(fixes.iter().any(|f| f.replacement == "free(p);"));
    }

    #[test]
    fn test_analyze_and_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("leak.c");
        std::fs::write(&path, LEAKY).expect("write");

        let store = BugStore::open_in_memory().expect("store");
        let verifier = CVerify::new();
        let report = verifier.analyze_and_record(&store, &path).expect("analyze");

        assert!(!report.findings.is_empty());
        let samples = store.code_samples().expect("samples");
        assert_eq!(samples.len(), 1);
        assert!(samples[0].has_bugs);
        assert_eq!(samples[0].bugs.len(), report.findings.len());
    }
}
