#![forbid(unsafe_code)]

//! Threshold checker

use crate::rules::{ExecutionContext, Rule, ThresholdRule, Violation};
use crate::types::Severity;

/// Checks the size of the change against the rule's caps
///
/// The file count comes from the caller; without it the file cap is not
/// checked.
pub fn check(rule: &Rule, threshold: &ThresholdRule, ctx: &ExecutionContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(max_lines) = threshold.max_lines_changed
        && ctx.diff.total_lines_changed > max_lines
    {
        violations.push(Violation::new(
            rule,
            Severity::Error,
            format!(
                "Changed {} lines (+{} -{}), exceeding the limit of {}",
                ctx.diff.total_lines_changed, ctx.diff.lines_added, ctx.diff.lines_removed, max_lines
            ),
        ));
    }

    if let (Some(max_files), Some(files_changed)) =
        (threshold.max_files_changed, ctx.files_changed_in_batch)
        && files_changed > max_files
    {
        violations.push(Violation::new(
            rule,
            Severity::Error,
            format!(
                "Changed {} files, exceeding the limit of {}",
                files_changed, max_files
            ),
        ));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff::diff;

    fn run(threshold: ThresholdRule, original: &str, modified: &str, files: Option<u32>) -> Vec<Violation> {
        let rule = Rule::Threshold(threshold.clone());
        let result = diff(original, modified);
        let added = result.added_text();
        let removed = result.removed_text();
        let ctx = ExecutionContext {
            original,
            modified,
            diff: &result,
            added_text: &added,
            removed_text: &removed,
            file_name: None,
            files_changed_in_batch: files,
        };
        check(&rule, &threshold, &ctx)
    }

    #[test]
    fn test_line_limit_exceeded() {
        let threshold = ThresholdRule {
            max_lines_changed: Some(1),
            require_approval: true,
            ..Default::default()
        };
        let violations = run(threshold, "a\nb\nc\n", "v\nw\nx\ny\nz\n", None);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message().contains("Changed 8 lines"));
    }

    #[test]
    fn test_line_limit_inclusive() {
        let threshold = ThresholdRule {
            max_lines_changed: Some(2),
            ..Default::default()
        };
        assert!(run(threshold, "a\n", "b\n", None).is_empty());
    }

    #[test]
    fn test_file_limit() {
        let threshold = ThresholdRule {
            max_files_changed: Some(3),
            ..Default::default()
        };
        assert!(run(threshold.clone(), "a", "b", None).is_empty());
        assert!(run(threshold.clone(), "a", "b", Some(3)).is_empty());

        let violations = run(threshold, "a", "b", Some(4));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
    }
}
