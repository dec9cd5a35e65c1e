use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use super::functions::{
    line_of_offset, line_offsets, scan_functions, strip_comments_and_strings, FunctionInfo,
};
use super::types::{AnalysisResults, FunctionSummary};
use super::warnings::BugWarning;
use super::{
    analyzer_buffer_overflow, analyzer_infinite_loop, analyzer_memory_leak,
    analyzer_missing_return, analyzer_null_pointer, analyzer_uninitialized,
};

/// Analyzes one C translation unit for defect patterns.
///
/// The analyzer owns the raw source plus a stripped copy in which
/// comment and string-literal contents are blanked out. Both share the
/// same byte layout, so detectors scan the stripped text and report
/// line numbers that are true for the original.
#[derive(Debug)]
pub struct SourceAnalyzer {
    /// Name of the analyzed file
    file_name: String,
    /// Raw source text
    source: String,
    /// Source with comments and string contents blanked
    stripped: String,
    /// Byte offset of each line start
    line_offsets: Vec<usize>,
    /// Function definitions found by the scanner
    functions: Vec<FunctionInfo>,
    /// Warnings produced while scanning the structure itself
    scan_warnings: Vec<BugWarning>,
}

impl SourceAnalyzer {
    /// Create a new analyzer over the given source text.
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let source = source.into();
        let stripped = strip_comments_and_strings(&source);
        let line_offsets = line_offsets(&stripped);
        let (functions, scan_warnings) = scan_functions(&stripped, &line_offsets);

        debug!(
            "scanned {}: {} lines, {} functions",
            file_name,
            line_offsets.len(),
            functions.len()
        );

        Self {
            file_name,
            source,
            stripped,
            line_offsets,
            functions,
            scan_warnings,
        }
    }

    /// Load and scan a file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, source))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    pub fn line_count(&self) -> usize {
        if self.source.is_empty() {
            0
        } else {
            self.line_offsets.len()
        }
    }

    /// 1-based line number of a byte offset into the source.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        line_of_offset(&self.line_offsets, offset)
    }

    /// Stripped body text of a scanned function.
    pub fn function_body<'a>(&'a self, function: &FunctionInfo) -> &'a str {
        &self.stripped[function.body_start..function.body_end]
    }

    /// Function whose body contains the given offset.
    pub fn function_at(&self, offset: usize) -> Option<&FunctionInfo> {
        self.functions
            .iter()
            .find(|f| offset >= f.body_start && offset < f.body_end)
    }

    /// Warnings produced by the structural scan itself.
    pub fn scan_warnings(&self) -> &[BugWarning] {
        &self.scan_warnings
    }

    /// Run every detector and collect the results.
    pub fn analyze(&self) -> AnalysisResults {
        let mut warnings = self.scan_warnings.clone();
        warnings.extend(analyzer_null_pointer::detect_null_dereferences(self));
        warnings.extend(analyzer_memory_leak::detect_memory_leaks(self));
        warnings.extend(analyzer_uninitialized::detect_uninitialized_reads(self));
        warnings.extend(analyzer_infinite_loop::detect_infinite_loops(self));
        warnings.extend(analyzer_buffer_overflow::detect_buffer_overflows(self));
        warnings.extend(analyzer_missing_return::detect_missing_returns(self));
        warnings.sort_by_key(|w| w.line);

        self.results_with(warnings)
    }

    /// Package an externally assembled warning list into results.
    pub fn results_with(&self, warnings: Vec<BugWarning>) -> AnalysisResults {
        AnalysisResults {
            file_name: self.file_name.clone(),
            line_count: self.line_count(),
            function_count: self.functions.len(),
            functions: self
                .functions
                .iter()
                .map(|f| FunctionSummary {
                    name: f.name.clone(),
                    return_type: f.return_type.clone(),
                    line: f.line,
                })
                .collect(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let analyzer = SourceAnalyzer::new("empty.c", "");
        let results = analyzer.analyze();

        assert_eq!(results.line_count, 0);
        assert_eq!(results.function_count, 0);
        assert!(results.warnings.is_empty());
    }

    #[test]
    fn test_clean_source_has_no_warnings() {
        let src = r#"
int sum_array(int arr[], int size) {
    int sum = 0;
    for (int i = 0; i < size; i++) {
        sum += arr[i];
    }
    return sum;
}
"#;
        let analyzer = SourceAnalyzer::new("clean.c", src);
        let results = analyzer.analyze();

        assert_eq!(results.function_count, 1);
        assert!(results.warnings.is_empty(), "got: {:?}", results.warnings);
    }

    #[test]
    fn test_warnings_sorted_by_line() {
        let src = r#"
void spin() {
    while (1) {
        int x;
    }
}

void copy(char* dest, char* src) {
    strcpy(dest, src);
}
"#;
        let analyzer = SourceAnalyzer::new("two.c", src);
        let results = analyzer.analyze();

        let lines: Vec<usize> = results.warnings.iter().map(|w| w.line).collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_line_count_ignores_trailing_newline() {
        let analyzer = SourceAnalyzer::new("two.c", "int x = 0;\nint y = 1;\n");
        assert_eq!(analyzer.line_count(), 2);

        let no_trailing = SourceAnalyzer::new("two.c", "int x = 0;\nint y = 1;");
        assert_eq!(no_trailing.line_count(), 2);
    }

    #[test]
    fn test_line_numbers_survive_string_continuation() {
        let src = "void banner() {\n    printf(\"a\\\nb\");\n    while (1) {\n    }\n}\n";
        let analyzer = SourceAnalyzer::new("banner.c", src);
        let results = analyzer.analyze();

        // The literal's continuation ends physical line 2; the loop
        // sits on line 4 and must be reported there.
        assert_eq!(results.warnings.len(), 1);
        assert_eq!(results.warnings[0].line, 4);
    }

    #[test]
    fn test_function_at() {
        let src = "int f() {\n    return 1;\n}\n";
        let analyzer = SourceAnalyzer::new("f.c", src);
        let body_offset = analyzer.functions()[0].body_start + 1;
        assert_eq!(analyzer.function_at(body_offset).map(|f| f.name.as_str()), Some("f"));
        assert!(analyzer.function_at(0).is_none());
    }
}
