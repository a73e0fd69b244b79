#![forbid(unsafe_code)]

//! Rule evaluation
//!
//! [`evaluate`] diffs the two texts once and dispatches every rule, in
//! declaration order, to the checker for its kind. The rule set is only read,
//! so independent evaluations may run concurrently.

use crate::config::RuleSet;
use crate::engine::diff::{DiffResult, diff};
use crate::rules::{ExecutionContext, Rule, Violation, content, dependency, refactor, scope, threshold};
use crate::types::Severity;
use serde::Serialize;

/// Outcome of evaluating one change against a rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when no violation has error severity
    pub valid: bool,

    /// Violations in rule declaration order
    pub violations: Vec<Violation>,

    pub diff: DiffResult,

    /// True when a human must sign off on the change
    pub requires_approval: bool,
}

impl ValidationResult {
    /// Number of error violations
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning violations
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Evaluates a change against a rule set
///
/// # Arguments
///
/// * `original` - Text before the change (empty for a new file)
/// * `modified` - Text after the change
/// * `rule_set` - Effective policy for the file
/// * `file_name` - Name of the changed file, used by scope rules
/// * `files_changed_in_batch` - Size of the surrounding batch, used by threshold rules
pub fn evaluate(
    original: &str,
    modified: &str,
    rule_set: &RuleSet,
    file_name: Option<&str>,
    files_changed_in_batch: Option<u32>,
) -> ValidationResult {
    let diff = diff(original, modified);
    let added_text = diff.added_text();
    let removed_text = diff.removed_text();

    let ctx = ExecutionContext {
        original,
        modified,
        diff: &diff,
        added_text: &added_text,
        removed_text: &removed_text,
        file_name,
        files_changed_in_batch,
    };

    let mut violations = Vec::new();
    let mut threshold_requires_approval = false;

    for rule in &rule_set.rules {
        let found = match rule {
            Rule::Scope(r) => scope::check(rule, r, &ctx),
            Rule::Refactor(r) => refactor::check(rule, r, &ctx),
            Rule::Dependency(r) => dependency::check(rule, r, &ctx),
            Rule::Content(r) => content::check(rule, r, &ctx),
            Rule::Threshold(r) => {
                let found = threshold::check(rule, r, &ctx);
                if r.require_approval && !found.is_empty() {
                    threshold_requires_approval = true;
                }
                found
            }
        };
        tracing::debug!(kind = %rule.kind(), count = found.len(), "rule evaluated");
        violations.extend(found);
    }

    if rule_set.global.strict_mode {
        for violation in &mut violations {
            violation.severity = Severity::Error;
        }
    }

    let valid = !violations.iter().any(|v| v.severity == Severity::Error);
    let requires_approval = rule_set.global.require_approval_for_all || threshold_requires_approval;

    ValidationResult {
        valid,
        violations,
        diff,
        requires_approval,
    }
}
