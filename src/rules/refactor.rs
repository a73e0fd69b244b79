#![forbid(unsafe_code)]

//! Refactor checker
//!
//! Each forbidden action is detected with a cheap lexical heuristic. A hit is
//! a signal for a reviewer, never proof, so every finding is a warning.

use crate::rules::patterns::{
    added_lines_matching, count_matches, extract_identifiers, normalize_whitespace, quote_list,
};
use crate::rules::{ExecutionContext, RefactorRule, Rule, Violation};
use crate::types::{ActionTag, Severity};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Error-handling idioms, with a short label for messages
static ERROR_HANDLING_IDIOMS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("try/catch block", r"\btry\s*\{"),
        ("promise .catch()", r"\.catch\s*\("),
        ("throw new", r"\bthrow\s+new\b"),
        ("error check", r"\bif\s*\(?[^\n]*\berr(?:or)?\b"),
    ]
    .into_iter()
    .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|re| (label, re)))
    .collect()
});

/// Comment syntaxes, with a short label for messages
static COMMENT_FORMS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("line comment", r"(?m)(?:^|[^:])//[^\n]*"),
        ("block comment", r"/\*[\s\S]*?\*/"),
        ("hash comment", r"(?m)^\s*#(?:\s|$)[^\n]*"),
    ]
    .into_iter()
    .filter_map(|(label, pattern)| Regex::new(pattern).ok().map(|re| (label, re)))
    .collect()
});

/// Checks every forbidden action of a refactor rule
pub fn check(rule: &Rule, refactor: &RefactorRule, ctx: &ExecutionContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for action in &refactor.forbid {
        let found = match action {
            ActionTag::VariableRenames => check_renames(rule, ctx),
            ActionTag::AddErrorHandling => check_error_handling(rule, ctx),
            ActionTag::AddComments => check_comments(rule, ctx),
            ActionTag::ChangeFormatting => check_formatting(rule, ctx),
        };
        violations.extend(found);
    }
    violations
}

/// Flags a change where some names disappear while unrelated new ones appear
fn check_renames(rule: &Rule, ctx: &ExecutionContext) -> Vec<Violation> {
    let removed = extract_identifiers(ctx.removed_text);
    let added = extract_identifiers(ctx.added_text);

    let vanished: BTreeSet<&String> = removed.difference(&added).collect();
    let introduced: BTreeSet<&String> = added.difference(&removed).collect();

    if vanished.is_empty() || introduced.is_empty() {
        return vec![];
    }

    vec![Violation::new(
        rule,
        Severity::Warning,
        format!(
            "Possible variable rename: {} removed while {} introduced",
            quote_list(vanished),
            quote_list(introduced)
        ),
    )]
}

fn check_error_handling(rule: &Rule, ctx: &ExecutionContext) -> Vec<Violation> {
    let mut labels = Vec::new();
    let mut lines = Vec::new();
    for (label, re) in ERROR_HANDLING_IDIOMS.iter() {
        if re.is_match(ctx.added_text) && !re.is_match(ctx.original) {
            labels.push(*label);
            lines.extend(added_lines_matching(ctx.diff, re));
        }
    }

    if labels.is_empty() {
        return vec![];
    }

    lines.sort_unstable();
    lines.dedup();
    vec![
        Violation::new(
            rule,
            Severity::Warning,
            format!("Error handling was added: {}", labels.join(", ")),
        )
        .with_lines(lines),
    ]
}

fn check_comments(rule: &Rule, ctx: &ExecutionContext) -> Vec<Violation> {
    COMMENT_FORMS
        .iter()
        .filter_map(|(label, re)| {
            let before = count_matches(re, ctx.original);
            let after = count_matches(re, ctx.modified);
            (after > before).then(|| {
                Violation::new(
                    rule,
                    Severity::Warning,
                    format!(
                        "Comments were added: {} count went from {} to {}",
                        label, before, after
                    ),
                )
                .with_lines(added_lines_matching(ctx.diff, re))
            })
        })
        .collect()
}

fn check_formatting(rule: &Rule, ctx: &ExecutionContext) -> Vec<Violation> {
    if ctx.original == ctx.modified {
        return vec![];
    }
    if normalize_whitespace(ctx.original) != normalize_whitespace(ctx.modified) {
        return vec![];
    }
    vec![Violation::new(
        rule,
        Severity::Warning,
        "Formatting-only change: the code differs only in whitespace",
    )]
}
