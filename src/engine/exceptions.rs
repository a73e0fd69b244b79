#![forbid(unsafe_code)]

//! Learning from approvals
//!
//! When a human approves a change that produced dependency or content
//! violations, the matching rules are relaxed so the same finding is not
//! reported again. Callers must serialize calls per policy file.

use crate::config::RuleSet;
use crate::rules::content::{ContentFinding, finding_from_details};
use crate::rules::dependency::{covered_by, package_from_details};
use crate::rules::{Rule, Violation};
use crate::types::RuleKind;
use serde::Serialize;
use std::fmt;

/// A single list mutation made to the rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionEdit {
    /// Kind of the rule that was edited
    pub rule_kind: RuleKind,

    /// Index of the edited rule in the rule set
    pub rule_index: usize,

    pub action: EditAction,

    /// The package, literal or pattern that moved
    pub value: String,
}

impl fmt::Display for ExceptionEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rule #{}: {} \"{}\"",
            self.rule_kind,
            self.rule_index + 1,
            self.action,
            self.value
        )
    }
}

/// What happened to a list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    AddedToAllowed,
    RemovedFromForbidden,
    RemovedFromForbid,
    RemovedFromPatternsDeny,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EditAction::AddedToAllowed => "added to allowed",
            EditAction::RemovedFromForbidden => "removed from forbidden",
            EditAction::RemovedFromForbid => "removed from forbid",
            EditAction::RemovedFromPatternsDeny => "removed from deny patterns",
        };
        f.write_str(text)
    }
}

/// Result of applying approved exceptions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExceptionOutcome {
    /// Whether the rule set changed at all
    pub mutated: bool,

    /// Every individual list mutation, in application order
    pub edits: Vec<ExceptionEdit>,
}

/// Relaxes `rule_set` so the approved `violations` stop firing
///
/// Only dependency and content violations are learnable; the rest are
/// ignored. Each violation edits the rule that produced it, so violations
/// whose rule is not part of `rule_set` leave it untouched. `mutated == false`
/// means nothing matched (for example the entry was already removed), which
/// is not an error.
pub fn apply_approved_exceptions(rule_set: &mut RuleSet, violations: &[Violation]) -> ExceptionOutcome {
    // Resolve targets before editing: once a rule is edited it no longer
    // compares equal to the copy carried by its other violations.
    let targets: Vec<Option<usize>> = violations
        .iter()
        .map(|v| rule_set.rules.iter().position(|r| *r == v.rule))
        .collect();

    let mut outcome = ExceptionOutcome::default();

    for (violation, target) in violations.iter().zip(targets) {
        let Some(details) = violation.details.as_deref() else {
            continue;
        };
        match violation.rule_kind {
            RuleKind::Dependency => {
                let Some(package) = package_from_details(details) else {
                    tracing::debug!(details, "no package name in dependency violation");
                    continue;
                };
                if let Some(index) = target {
                    allow_dependency(rule_set, index, package, &mut outcome.edits);
                }
            }
            RuleKind::Content => {
                let Some(finding) = finding_from_details(details) else {
                    tracing::debug!(details, "no literal or pattern in content violation");
                    continue;
                };
                if let Some(index) = target {
                    allow_content(rule_set, index, finding, &mut outcome.edits);
                }
            }
            RuleKind::Scope | RuleKind::Refactor | RuleKind::Threshold => {}
        }
    }

    outcome.mutated = !outcome.edits.is_empty();
    if !outcome.mutated {
        tracing::info!("approved violations left the policy unchanged");
    }
    outcome
}

/// Removes every entry matching `value`, returning whether any was removed
fn remove_where(list: &mut Option<Vec<String>>, matches: impl Fn(&str) -> bool) -> bool {
    let Some(items) = list else {
        return false;
    };
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

fn allow_dependency(rule_set: &mut RuleSet, index: usize, package: &str, edits: &mut Vec<ExceptionEdit>) {
    let Some(Rule::Dependency(dep)) = rule_set.rules.get_mut(index) else {
        return;
    };

    // Only extend an existing allow list; creating one would turn a deny-only
    // rule into an allow-only rule.
    if let Some(allowed) = dep.allowed.as_mut()
        && !allowed.iter().any(|entry| covered_by(package, entry))
    {
        allowed.push(package.to_string());
        edits.push(ExceptionEdit {
            rule_kind: RuleKind::Dependency,
            rule_index: index,
            action: EditAction::AddedToAllowed,
            value: package.to_string(),
        });
    }

    // Entries are compared the way the checker compares them, so `@angular`
    // is removed for a violation on `angular`.
    if remove_where(&mut dep.forbidden, |entry| covered_by(package, entry)) {
        edits.push(ExceptionEdit {
            rule_kind: RuleKind::Dependency,
            rule_index: index,
            action: EditAction::RemovedFromForbidden,
            value: package.to_string(),
        });
    }
}

fn allow_content(
    rule_set: &mut RuleSet,
    index: usize,
    finding: ContentFinding<'_>,
    edits: &mut Vec<ExceptionEdit>,
) {
    let Some(Rule::Content(content)) = rule_set.rules.get_mut(index) else {
        return;
    };

    let (removed, action, value) = match finding {
        ContentFinding::Literal(lit) => (
            remove_where(&mut content.forbid, |entry| entry == lit),
            EditAction::RemovedFromForbid,
            lit,
        ),
        ContentFinding::Pattern(pat) => (
            remove_where(&mut content.patterns_deny, |entry| entry == pat),
            EditAction::RemovedFromPatternsDeny,
            pat,
        ),
    };

    if removed {
        edits.push(ExceptionEdit {
            rule_kind: RuleKind::Content,
            rule_index: index,
            action,
            value: value.to_string(),
        });
    }
}
