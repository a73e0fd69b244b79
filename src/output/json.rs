#![forbid(unsafe_code)]

//! JSON output formatter for machine-readable output
//!
//! A single file is printed as one object; a batch (the `git` subcommand) is
//! printed as an array of such objects in input order.

use crate::output::FileReport;
use crate::rules::Violation;
use crate::types::{RuleKind, Severity};
use serde::Serialize;

/// JSON output formatter, always indented
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter
    }

    /// Formats a single file report as a JSON object
    pub fn format(&self, report: &FileReport<'_>) -> Result<String, serde_json::Error> {
        self.render(&FileRecord::from(report))
    }

    /// Formats a batch of file reports as a JSON array
    pub fn format_batch(&self, reports: &[FileReport<'_>]) -> Result<String, serde_json::Error> {
        let records: Vec<FileRecord> = reports.iter().map(FileRecord::from).collect();
        self.render(&records)
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(value)
    }
}

/// Per-file record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileRecord<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    summary: SummaryRecord,
    violations: Vec<ViolationRecord<'a>>,
    requires_approval: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRecord {
    lines_added: u32,
    lines_removed: u32,
    total_lines_changed: u32,
    violation_count: usize,
    error_count: usize,
    warning_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViolationRecord<'a> {
    rule_type: RuleKind,
    severity: Severity,
    description: &'a str,
    details: Option<&'a str>,
    line_numbers: Option<&'a [u32]>,
}

impl<'a> From<&'a Violation> for ViolationRecord<'a> {
    fn from(v: &'a Violation) -> Self {
        ViolationRecord {
            rule_type: v.rule_kind,
            severity: v.severity,
            description: &v.description,
            details: v.details.as_deref(),
            line_numbers: v.line_numbers.as_deref(),
        }
    }
}

impl<'a> From<&FileReport<'a>> for FileRecord<'a> {
    fn from(report: &FileReport<'a>) -> Self {
        let result = report.result;
        FileRecord {
            valid: result.valid,
            file_name: report.file_name,
            summary: SummaryRecord {
                lines_added: result.diff.lines_added,
                lines_removed: result.diff.lines_removed,
                total_lines_changed: result.diff.total_lines_changed,
                violation_count: result.violations.len(),
                error_count: result.error_count(),
                warning_count: result.warning_count(),
            },
            violations: result.violations.iter().map(ViolationRecord::from).collect(),
            requires_approval: result.requires_approval,
        }
    }
}
