use serde::{Deserialize, Serialize};

use super::warnings::BugWarning;

/// Results of analyzing one translation unit
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisResults {
    /// Name of the analyzed file
    pub file_name: String,
    /// Number of source lines
    pub line_count: usize,
    /// Number of function definitions found
    pub function_count: usize,
    /// Summary of each function definition
    pub functions: Vec<FunctionSummary>,
    /// All warnings, ordered by line
    pub warnings: Vec<BugWarning>,
}

impl AnalysisResults {
    /// Whether any warning was produced.
    pub fn has_bugs(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Summary of a scanned function definition
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FunctionSummary {
    /// Function name
    pub name: String,
    /// Declared return type
    pub return_type: String,
    /// 1-based line of the signature
    pub line: usize,
}
