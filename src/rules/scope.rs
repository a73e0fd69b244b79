#![forbid(unsafe_code)]

//! Scope checker
//!
//! A scope rule pins a change to certain files, functions or regions of the
//! original text.

use crate::rules::patterns::{compile_user_pattern, glob_to_regex, quote_list};
use crate::rules::{ExecutionContext, Rule, ScopeRule, Violation};
use crate::types::Severity;
use regex::Regex;

/// Checks a scope rule against the change
pub fn check(rule: &Rule, scope: &ScopeRule, ctx: &ExecutionContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let (Some(files), Some(file_name)) = (&scope.files, ctx.file_name)
        && !files.is_empty()
        && !files.iter().any(|pattern| file_matches(pattern, file_name))
    {
        violations.push(Violation::new(
            rule,
            Severity::Error,
            format!(
                "File \"{}\" is outside the allowed scope ({})",
                file_name,
                quote_list(files)
            ),
        ));
    }

    if let Some(functions) = &scope.functions
        && !functions.is_empty()
        && ctx.diff.has_changes()
        && !functions
            .iter()
            .any(|name| function_declared(name, ctx.original))
    {
        violations.push(Violation::new(
            rule,
            Severity::Warning,
            format!(
                "None of the scoped functions ({}) exist in the original code, so the scope cannot be enforced",
                quote_list(functions)
            ),
        ));
    }

    if let Some(pattern) = &scope.pattern
        && ctx.diff.has_changes()
        && let Some(re) = compile_user_pattern(pattern)
        && !re.is_match(ctx.original)
    {
        violations.push(Violation::new(
            rule,
            Severity::Warning,
            format!(
                "Scope pattern \"{}\" does not occur in the original code, so the scope cannot be enforced",
                pattern
            ),
        ));
    }

    violations
}

/// Matches a file name against a scope pattern
///
/// Patterns containing `*` are treated as globs; anything else matches when
/// either string contains the other.
fn file_matches(pattern: &str, file_name: &str) -> bool {
    if pattern.contains('*') {
        glob_to_regex(pattern).is_some_and(|re| re.is_match(file_name))
    } else {
        file_name.contains(pattern) || pattern.contains(file_name)
    }
}

/// Looks for a declaration-shaped occurrence of `name` in `text`
fn function_declared(name: &str, text: &str) -> bool {
    let name = regex::escape(name.trim());
    if name.is_empty() {
        return false;
    }
    let shapes = [
        format!(r"\bfunction\s*\*?\s*{name}\s*\("),
        format!(r"\b{name}\s*[:=]\s*(?:async\s+)?(?:function\b|\([^()]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)"),
        format!(r"\b(?:def|fn)\s+{name}\b"),
        format!(r"(?m)^\s*(?:(?:public|private|protected|static|async|pub)\s+)*{name}\s*\([^()]*\)\s*\{{"),
    ];
    shapes
        .iter()
        .filter_map(|shape| Regex::new(shape).ok())
        .any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff::diff;

    fn run(scope: ScopeRule, original: &str, modified: &str, file: Option<&str>) -> Vec<Violation> {
        let rule = Rule::Scope(scope.clone());
        let result = diff(original, modified);
        let added = result.added_text();
        let removed = result.removed_text();
        let ctx = ExecutionContext {
            original,
            modified,
            diff: &result,
            added_text: &added,
            removed_text: &removed,
            file_name: file,
            files_changed_in_batch: None,
        };
        check(&rule, &scope, &ctx)
    }

    #[test]
    fn test_file_glob_match() {
        let scope = ScopeRule {
            description: "parser only".to_string(),
            files: Some(vec!["src/parser/*.ts".to_string()]),
            ..Default::default()
        };
        assert!(run(scope.clone(), "a", "b", Some("src/parser/lexer.ts")).is_empty());

        let violations = run(scope, "a", "b", Some("src/server/app.ts"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Error);
        assert!(violations[0].message().contains("src/server/app.ts"));
    }

    #[test]
    fn test_file_substring_either_direction() {
        assert!(file_matches("parser", "src/parser/lexer.ts"));
        assert!(file_matches("/repo/src/parser/lexer.ts", "lexer.ts"));
        assert!(!file_matches("server", "src/parser/lexer.ts"));
    }

    #[test]
    fn test_files_ignored_without_file_name() {
        let scope = ScopeRule {
            files: Some(vec!["src/*".to_string()]),
            ..Default::default()
        };
        assert!(run(scope, "a", "b", None).is_empty());
    }

    #[test]
    fn test_missing_function_warns() {
        let scope = ScopeRule {
            functions: Some(vec!["parseHeader".to_string()]),
            ..Default::default()
        };
        let violations = run(scope, "function other() {}\n", "function other() { return 1; }\n", None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn test_existing_function_no_warning() {
        let scope = ScopeRule {
            functions: Some(vec!["parseHeader".to_string(), "missing".to_string()]),
            ..Default::default()
        };
        let original = "function parseHeader(input) {\n  return input;\n}\n";
        let modified = "function parseHeader(input) {\n  return input.trim();\n}\n";
        assert!(run(scope, original, modified, None).is_empty());
    }

    #[test]
    fn test_function_shapes() {
        assert!(function_declared("load", "const load = async function() {}"));
        assert!(function_declared("load", "const load = (a) => a"));
        assert!(function_declared("load", "def load(self):"));
        assert!(function_declared("load", "pub fn load() {}"));
        assert!(function_declared("load", "  async load(path) {\n"));
        assert!(!function_declared("load", "reload();"));
    }

    #[test]
    fn test_function_warning_needs_changes() {
        let scope = ScopeRule {
            functions: Some(vec!["absent".to_string()]),
            ..Default::default()
        };
        assert!(run(scope, "same\n", "same\n", None).is_empty());
    }

    #[test]
    fn test_pattern_absent_warns() {
        let scope = ScopeRule {
            pattern: Some(r"class\s+Parser".to_string()),
            ..Default::default()
        };
        let violations = run(scope.clone(), "class Lexer {}", "class Lexer { x }", None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);

        assert!(run(scope, "class Parser {}", "class Parser { x }", None).is_empty());
    }

    #[test]
    fn test_invalid_scope_pattern_is_skipped() {
        let scope = ScopeRule {
            pattern: Some("(".to_string()),
            ..Default::default()
        };
        assert!(run(scope, "a", "b", None).is_empty());
    }
}
