// Report Generation for C Verify
//
// This module handles the generation and formatting of analysis reports.

use crate::api::types::{AnalysisReport, Finding, FindingLocation, FindingSeverity};
use anyhow::Result;
use std::fs;
use std::path::Path;

/// Report formatter for C Verify
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a report as JSON
    pub fn to_json(report: &AnalysisReport) -> Result<String> {
        let json = serde_json::to_string_pretty(report)?;
        Ok(json)
    }

    /// Format a report as plain text
    pub fn to_text(report: &AnalysisReport) -> String {
        let mut output = String::new();

        output.push_str("C Verify Analysis Report\n");
        output.push_str("========================\n\n");

        output.push_str(&format!("Timestamp: {}\n", report.timestamp));
        output.push_str(&format!("File: {}\n", report.file_name));
        output.push_str(&format!("Source Lines: {}\n", report.source_lines));
        output.push_str(&format!("Functions Analyzed: {}\n\n", report.functions_analyzed));

        output.push_str(&format!("Findings: {}\n", report.findings.len()));
        output.push_str("---------\n\n");

        for (label, group) in Self::group_by_severity(report) {
            if group.is_empty() {
                continue;
            }
            output.push_str(&format!("{}: {} issues\n", label, group.len()));
            Self::format_findings(&mut output, &group);
        }

        output.push_str("\nAnalysis Configuration\n");
        output.push_str("---------------------\n");
        let config = &report.analysis_config;
        output.push_str(&format!("Detect Null Pointer: {}\n", config.detect_null_pointer));
        output.push_str(&format!("Detect Memory Leak: {}\n", config.detect_memory_leak));
        output.push_str(&format!("Detect Uninitialized: {}\n", config.detect_uninitialized));
        output.push_str(&format!("Detect Infinite Loop: {}\n", config.detect_infinite_loop));
        output.push_str(&format!("Detect Buffer Overflow: {}\n", config.detect_buffer_overflow));
        output.push_str(&format!("Detect Missing Return: {}\n", config.detect_missing_return));
        output.push_str(&format!("Classifier Threshold: {}\n", config.classifier_threshold));

        output
    }

    /// Format findings for text output
    fn format_findings(output: &mut String, findings: &[&Finding]) {
        for (i, finding) in findings.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, finding.title));
            output.push_str(&format!("   Severity: {:?}\n", finding.severity));
            output.push_str(&format!("   Location: {}\n", Self::location_text(&finding.location)));
            output.push_str(&format!("   Description: {}\n", finding.description));
            output.push_str(&format!("   Recommendation: {}\n\n", finding.recommendation));
        }
    }

    fn location_text(location: &FindingLocation) -> String {
        match location {
            FindingLocation::Line(line) => format!("line {}", line),
            FindingLocation::Function(name) => format!("function {}", name),
            FindingLocation::Unknown => "unknown".to_string(),
        }
    }

    fn group_by_severity(report: &AnalysisReport) -> Vec<(&'static str, Vec<&Finding>)> {
        let mut critical = Vec::new();
        let mut high = Vec::new();
        let mut medium = Vec::new();
        let mut low = Vec::new();
        let mut info = Vec::new();

        for finding in &report.findings {
            match finding.severity {
                FindingSeverity::Critical => critical.push(finding),
                FindingSeverity::High => high.push(finding),
                FindingSeverity::Medium => medium.push(finding),
                FindingSeverity::Low => low.push(finding),
                FindingSeverity::Info => info.push(finding),
            }
        }

        vec![
            ("CRITICAL", critical),
            ("HIGH", high),
            ("MEDIUM", medium),
            ("LOW", low),
            ("INFO", info),
        ]
    }

    /// Save a report to a file
    pub fn save_to_file<P: AsRef<Path>>(
        report: &AnalysisReport,
        path: P,
        format: ReportFormat,
    ) -> Result<()> {
        let content = match format {
            ReportFormat::Json => Self::to_json(report)?,
            ReportFormat::Text => Self::to_text(report),
            ReportFormat::Html => Self::to_html(report),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Format a report as HTML
    pub fn to_html(report: &AnalysisReport) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");
        html.push_str("<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        html.push_str("  <title>C Verify Analysis Report</title>\n");
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Arial, sans-serif; margin: 0; padding: 20px; }\n");
        html.push_str("    h1 { color: #333; }\n");
        html.push_str("    .info-box { background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin-bottom: 20px; }\n");
        html.push_str("    .finding-critical { background-color: #ffdddd; border-left: 5px solid #ff0000; padding: 10px; margin-bottom: 10px; }\n");
        html.push_str("    .finding-high { background-color: #ffeeee; border-left: 5px solid #ff6600; padding: 10px; margin-bottom: 10px; }\n");
        html.push_str("    .finding-medium { background-color: #ffffee; border-left: 5px solid #ffcc00; padding: 10px; margin-bottom: 10px; }\n");
        html.push_str("    .finding-low { background-color: #eeffee; border-left: 5px solid #00cc00; padding: 10px; margin-bottom: 10px; }\n");
        html.push_str("    .finding-info { background-color: #eeeeff; border-left: 5px solid #0066ff; padding: 10px; margin-bottom: 10px; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n");
        html.push_str("<body>\n");

        html.push_str("  <h1>C Verify Analysis Report</h1>\n");

        html.push_str("  <div class=\"info-box\">\n");
        html.push_str(&format!("    <p><strong>Timestamp:</strong> {}</p>\n", report.timestamp));
        html.push_str(&format!("    <p><strong>File:</strong> {}</p>\n", report.file_name));
        html.push_str(&format!("    <p><strong>Source Lines:</strong> {}</p>\n", report.source_lines));
        html.push_str(&format!("    <p><strong>Functions Analyzed:</strong> {}</p>\n", report.functions_analyzed));
        html.push_str("  </div>\n");

        html.push_str(&format!("  <h2>Findings: {}</h2>\n", report.findings.len()));

        for (label, group) in Self::group_by_severity(report) {
            if group.is_empty() {
                continue;
            }
            html.push_str(&format!("  <h3>{}: {} issues</h3>\n", label, group.len()));
            let class = format!("finding-{}", label.to_lowercase());
            Self::format_findings_html(&mut html, &group, &class);
        }

        html.push_str("  <h2>Analysis Configuration</h2>\n");
        html.push_str("  <div class=\"info-box\">\n");
        let config = &report.analysis_config;
        html.push_str(&format!("    <p><strong>Detect Null Pointer:</strong> {}</p>\n", config.detect_null_pointer));
        html.push_str(&format!("    <p><strong>Detect Memory Leak:</strong> {}</p>\n", config.detect_memory_leak));
        html.push_str(&format!("    <p><strong>Detect Uninitialized:</strong> {}</p>\n", config.detect_uninitialized));
        html.push_str(&format!("    <p><strong>Detect Infinite Loop:</strong> {}</p>\n", config.detect_infinite_loop));
        html.push_str(&format!("    <p><strong>Detect Buffer Overflow:</strong> {}</p>\n", config.detect_buffer_overflow));
        html.push_str(&format!("    <p><strong>Detect Missing Return:</strong> {}</p>\n", config.detect_missing_return));
        html.push_str(&format!("    <p><strong>Classifier Threshold:</strong> {}</p>\n", config.classifier_threshold));
        html.push_str("  </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }

    /// Format findings for HTML output
    fn format_findings_html(html: &mut String, findings: &[&Finding], class: &str) {
        for finding in findings {
            html.push_str(&format!("<div class=\"finding {}\">\n", class));
            html.push_str(&format!("  <h3>{}</h3>\n", finding.title));
            html.push_str(&format!("  <p><strong>Severity:</strong> {:?}</p>\n", finding.severity));
            html.push_str(&format!("  <p><strong>Location:</strong> {}</p>\n", Self::location_text(&finding.location)));
            html.push_str(&format!("  <p><strong>Description:</strong> {}</p>\n", finding.description));
            html.push_str(&format!("  <p><strong>Recommendation:</strong> {}</p>\n", finding.recommendation));
            html.push_str("</div>\n");
        }
    }
}

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON format
    Json,

    /// Plain text format
    Text,

    /// HTML format
    Html,
}

impl ReportFormat {
    /// Parse a format name as given on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "html" => Some(Self::Html),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::AnalysisConfig;
    use crate::analysis::warnings::BugKind;
    use chrono::Utc;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            timestamp: Utc::now(),
            file_name: "example.c".to_string(),
            source_lines: 40,
            functions_analyzed: 3,
            findings: vec![Finding {
                title: "Memory Leak".to_string(),
                description: "`p` allocated with malloc is never freed".to_string(),
                severity: FindingSeverity::High,
                kind: BugKind::MemoryLeak,
                location: FindingLocation::Line(7),
                recommendation: "Free the allocation on every path".to_string(),
            }],
            analysis_config: AnalysisConfig::default(),
        }
    }

    #[test]
    fn test_text_report_lists_findings() {
        let text = ReportFormatter::to_text(&sample_report());

        assert!(text.contains("Findings: 1"));
        assert!(text.contains("HIGH: 1 issues"));
        assert!(text.contains("Memory Leak"));
        assert!(text.contains("line 7"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let json = ReportFormatter::to_json(&sample_report()).expect("json");
        let parsed: AnalysisReport = serde_json::from_str(&json).expect("parse");

        assert_eq!(parsed.file_name, "example.c");
        assert_eq!(parsed.findings.len(), 1);
    }

    #[test]
    fn test_html_report_has_severity_class() {
        let html = ReportFormatter::to_html(&sample_report());
        assert!(html.contains("finding-high"));
        assert!(html.contains("example.c"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ReportFormat::parse("JSON"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::parse("text"), Some(ReportFormat::Text));
        assert!(ReportFormat::parse("pdf").is_none());
    }
}
