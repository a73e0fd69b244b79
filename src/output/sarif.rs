//! SARIF 2.1.0 formatter for code-scanning integrations

use crate::output::FileReport;
use crate::rules::Violation;
use crate::types::{RuleKind, Severity};
use serde_json::{Value, json};
use std::collections::BTreeMap;

const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

/// SARIF 2.1.0 formatter
pub struct SarifFormatter {
    pub tool_name: String,
    pub tool_version: String,
}

impl SarifFormatter {
    pub fn new() -> Self {
        Self {
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn level(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    /// Builds the SARIF log for a batch of file reports
    pub fn to_value(&self, reports: &[FileReport<'_>]) -> Value {
        json!({
            "$schema": SARIF_SCHEMA,
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": self.tool_name,
                        "version": self.tool_version,
                        "rules": self.build_rules(reports)
                    }
                },
                "results": self.build_results(reports)
            }]
        })
    }

    /// Formats a batch of file reports as a SARIF document
    pub fn format(&self, reports: &[FileReport<'_>]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_value(reports))
    }

    /// One rule entry per distinct rule kind, in kind order
    fn build_rules(&self, reports: &[FileReport<'_>]) -> Vec<Value> {
        let mut kinds: BTreeMap<RuleKind, &Violation> = BTreeMap::new();
        for report in reports {
            for violation in &report.result.violations {
                kinds.entry(violation.rule_kind).or_insert(violation);
            }
        }

        kinds
            .into_iter()
            .map(|(kind, first)| {
                json!({
                    "id": kind.as_str(),
                    "shortDescription": {
                        "text": format!("{} rule", kind)
                    },
                    "defaultConfiguration": {
                        "level": Self::level(first.severity)
                    }
                })
            })
            .collect()
    }

    fn build_results(&self, reports: &[FileReport<'_>]) -> Vec<Value> {
        let mut results = Vec::new();

        for report in reports {
            for violation in &report.result.violations {
                let start_line = violation
                    .line_numbers
                    .as_ref()
                    .and_then(|lines| lines.first().copied())
                    .unwrap_or(1);

                let mut location = json!({
                    "physicalLocation": {
                        "region": {
                            "startLine": start_line
                        }
                    }
                });
                if let Some(uri) = report.file_name {
                    location["physicalLocation"]["artifactLocation"] = json!({ "uri": uri });
                }

                let mut result = json!({
                    "ruleId": violation.rule_kind.as_str(),
                    "level": Self::level(violation.severity),
                    "message": {
                        "text": violation.message()
                    },
                    "locations": [location]
                });
                if let Some(lines) = &violation.line_numbers {
                    result["properties"] = json!({
                        "description": violation.description,
                        "lineNumbers": lines
                    });
                }

                results.push(result);
            }
        }

        results
    }
}

impl Default for SarifFormatter {
    fn default() -> Self {
        Self::new()
    }
}
