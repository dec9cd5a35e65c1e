// API Types for C Verify
//
// This module defines the data structures used by the C Verify API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::warnings::{BugKind, Severity};

/// Analysis report for a C source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the analysis was performed
    pub timestamp: DateTime<Utc>,

    /// Name of the analyzed file
    pub file_name: String,

    /// Number of source lines
    pub source_lines: usize,

    /// Number of function definitions analyzed
    pub functions_analyzed: usize,

    /// Detected findings
    pub findings: Vec<Finding>,

    /// Configuration used for the analysis
    pub analysis_config: AnalysisConfig,
}

/// A single defect finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Title of the finding
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Severity level
    pub severity: FindingSeverity,

    /// Defect class
    pub kind: BugKind,

    /// Location in the source
    pub location: FindingLocation,

    /// Recommendation for fixing
    pub recommendation: String,
}

/// Severity levels for findings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingSeverity {
    /// Informational issue, not a defect on its own
    Info,

    /// Low severity issue
    Low,

    /// Medium severity issue
    Medium,

    /// High severity issue
    High,

    /// Critical severity issue
    Critical,
}

impl From<Severity> for FindingSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Info,
            Severity::Low => Self::Low,
            Severity::Medium => Self::Medium,
            Severity::High => Self::High,
            Severity::Critical => Self::Critical,
        }
    }
}

/// Location of a finding in the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FindingLocation {
    /// 1-based source line
    Line(usize),

    /// Named function, when no line is known
    Function(String),

    /// Unknown location
    Unknown,
}

/// Configuration for the analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Whether to detect null pointer dereferences
    pub detect_null_pointer: bool,

    /// Whether to detect memory leaks
    pub detect_memory_leak: bool,

    /// Whether to detect uninitialized variable reads
    pub detect_uninitialized: bool,

    /// Whether to detect infinite loops
    pub detect_infinite_loop: bool,

    /// Whether to detect buffer overflows
    pub detect_buffer_overflow: bool,

    /// Whether to detect missing return statements
    pub detect_missing_return: bool,

    /// Minimum confidence for classifier predictions
    pub classifier_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            detect_null_pointer: true,
            detect_memory_leak: true,
            detect_uninitialized: true,
            detect_infinite_loop: true,
            detect_buffer_overflow: true,
            detect_missing_return: true,
            classifier_threshold: 0.25,
        }
    }
}
