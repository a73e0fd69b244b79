#![forbid(unsafe_code)]

//! Content checker
//!
//! Forbidden literals and deny patterns only fire when the change introduces
//! something new: content already present in the original is tolerated.

use crate::rules::patterns::{
    added_lines_containing, added_lines_matching, compile_user_pattern, count_matches,
    extract_function_names, quote_list,
};
use crate::rules::{ContentRule, ExecutionContext, Rule, Violation};
use crate::types::Severity;

/// More new function names than this breaks `use_existing_only`
const MAX_NEW_FUNCTIONS: usize = 3;

const FORBIDDEN_PREFIX: &str = "Forbidden content \"";
const FORBIDDEN_SUFFIX: &str = "\" was added";
const PATTERN_PREFIX: &str = "Forbidden pattern \"";
const PATTERN_SUFFIX: &str = "\" matched ";

/// Checks a content rule against the change
pub fn check(rule: &Rule, content: &ContentRule, ctx: &ExecutionContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    for literal in content.forbid.iter().flatten() {
        if literal.is_empty() {
            continue;
        }
        if ctx.added_text.contains(literal.as_str()) && !ctx.original.contains(literal.as_str()) {
            violations.push(
                Violation::new(
                    rule,
                    Severity::Error,
                    format!("{}{}{}", FORBIDDEN_PREFIX, literal, FORBIDDEN_SUFFIX),
                )
                .with_lines(added_lines_containing(ctx.diff, literal)),
            );
        }
    }

    for pattern in content.patterns_deny.iter().flatten() {
        let Some(re) = compile_user_pattern(pattern) else {
            continue;
        };
        let before = count_matches(&re, ctx.original);
        let after = count_matches(&re, ctx.modified);
        if after > before {
            violations.push(
                Violation::new(
                    rule,
                    Severity::Error,
                    format!(
                        "{}{}{}{} new time(s)",
                        PATTERN_PREFIX,
                        pattern,
                        PATTERN_SUFFIX,
                        after - before
                    ),
                )
                .with_lines(added_lines_matching(ctx.diff, &re)),
            );
        }
    }

    if content.requires_existing_only() {
        let existing = extract_function_names(ctx.original);
        let generated = extract_function_names(ctx.modified);
        let new_names: Vec<&String> = generated.difference(&existing).collect();
        if new_names.len() > MAX_NEW_FUNCTIONS {
            violations.push(Violation::new(
                rule,
                Severity::Warning,
                format!(
                    "Change introduces {} new functions ({}) instead of reusing existing code",
                    new_names.len(),
                    quote_list(new_names.iter().copied())
                ),
            ));
        }
    }

    violations
}

/// What a content violation flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFinding<'a> {
    /// A forbidden literal
    Literal(&'a str),
    /// A deny pattern
    Pattern(&'a str),
}

/// Pulls the offending literal or pattern back out of a violation's details
pub fn finding_from_details(details: &str) -> Option<ContentFinding<'_>> {
    if let Some(rest) = details.strip_prefix(FORBIDDEN_PREFIX) {
        return rest
            .strip_suffix(FORBIDDEN_SUFFIX)
            .map(ContentFinding::Literal);
    }
    if let Some(rest) = details.strip_prefix(PATTERN_PREFIX) {
        let end = rest.rfind(PATTERN_SUFFIX)?;
        return Some(ContentFinding::Pattern(&rest[..end]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff::diff;

    fn run(content: ContentRule, original: &str, modified: &str) -> Vec<Violation> {
        let rule = Rule::Content(content.clone());
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
            files_changed_in_batch: None,
        };
        check(&rule, &content, &ctx)
    }

    fn forbid(items: &[&str]) -> ContentRule {
        ContentRule {
            forbid: Some(items.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_forbidden_literal_added() {
        let violations = run(
            forbid(&["console.log"]),
            "function test() {}",
            "function test() { console.log('debug'); }",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
        assert_eq!(violations[0].line_numbers, Some(vec![1]));
    }

    #[test]
    fn test_existing_literal_tolerated() {
        let text = "console.log(\"existing\")";
        assert!(run(forbid(&["console.log"]), text, text).is_empty());
    }

    #[test]
    fn test_literal_in_original_but_added_again() {
        let violations = run(
            forbid(&["console.log"]),
            "console.log(1);\n",
            "console.log(1);\nconsole.log(2);\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn test_deny_pattern_count_grows() {
        let rule = ContentRule {
            patterns_deny: Some(vec![r"eval\(".to_string()]),
            ..Default::default()
        };
        let violations = run(rule.clone(), "eval(a);\n", "eval(a);\neval(b);\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message().contains("1 new time(s)"));
        assert_eq!(violations[0].line_numbers, Some(vec![2]));

        assert!(run(rule, "eval(a);\n", "eval(b);\n").is_empty());
    }

    #[test]
    fn test_invalid_deny_pattern_skipped() {
        let rule = ContentRule {
            patterns_deny: Some(vec!["[unclosed".to_string(), "TODO".to_string()]),
            ..Default::default()
        };
        let violations = run(rule, "", "// TODO\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message().contains("TODO"));
    }

    #[test]
    fn test_use_existing_only() {
        let rule = ContentRule {
            require: Some("use_existing_only".to_string()),
            ..Default::default()
        };
        let original = "function a() {}\n";
        let few = "function a() {}\nfunction b() {}\nfunction c() {}\nfunction d() {}\n";
        assert!(run(rule.clone(), original, few).is_empty());

        let many = format!("{}function e() {{}}\n", few);
        let violations = run(rule, original, &many);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message().contains("4 new functions"));
    }

    #[test]
    fn test_finding_from_details_round_trip() {
        let violations = run(forbid(&["say \"hi\""]), "", "say \"hi\" now");
        let details = violations[0].details.as_deref().unwrap();
        assert_eq!(
            finding_from_details(details),
            Some(ContentFinding::Literal("say \"hi\""))
        );

        assert_eq!(
            finding_from_details("Forbidden pattern \"a\\\" matched b\" matched 2 new time(s)"),
            Some(ContentFinding::Pattern("a\\\" matched b"))
        );
        assert_eq!(finding_from_details("unrelated"), None);
    }
}
