#![forbid(unsafe_code)]

//! Lexical helpers shared by the rule checkers
//!
//! Detection is deliberately regex based. None of these helpers understand
//! code; they look for declaration-shaped text in any language.

use crate::engine::diff::DiffResult;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Identifiers introduced by declarations or plain assignments
static IDENTIFIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_builtin(&[
        r"\b(?:let|const|var)\s+(?:mut\s+)?([A-Za-z_$][\w$]*)",
        r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)",
        r"\b(?:def|fn)\s+([A-Za-z_][\w]*)",
        r"(?m)^\s*([A-Za-z_$][\w$]*)\s*=[^=>]",
    ])
});

/// Function-like names: declarations, assigned closures and method headers
static FUNCTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_builtin(&[
        r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(",
        r"\b([A-Za-z_$][\w$]*)\s*[:=]\s*(?:async\s+)?function\b",
        r"\b([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?\([^()]*\)\s*=>",
        r"\b(?:def|fn)\s+([A-Za-z_][\w]*)",
        r"(?m)^\s*(?:async\s+)?([A-Za-z_$][\w$]*)\s*\([^()\n]*\)\s*\{",
    ])
});

/// Control-flow keywords that look like method headers to the patterns above
const KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "else", "do", "try", "with",
];

fn compile_builtin(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

/// Compiles a user-supplied pattern, logging and discarding invalid ones
pub fn compile_user_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "skipping invalid pattern");
            None
        }
    }
}

/// Counts non-overlapping matches
///
/// `find_iter` steps past empty matches, so zero-width patterns terminate.
pub fn count_matches(re: &Regex, text: &str) -> usize {
    re.find_iter(text).count()
}

/// Collects the first capture group of every match of every pattern
fn capture_names(patterns: &[Regex], text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for re in patterns {
        for caps in re.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                let name = name.as_str();
                if !KEYWORDS.contains(&name) {
                    names.insert(name.to_string());
                }
            }
        }
    }
    names
}

/// Candidate identifier names declared or assigned in `text`
pub fn extract_identifiers(text: &str) -> BTreeSet<String> {
    capture_names(&IDENTIFIER_PATTERNS, text)
}

/// Candidate function names declared in `text`
pub fn extract_function_names(text: &str) -> BTreeSet<String> {
    capture_names(&FUNCTION_PATTERNS, text)
}

/// Collapses every whitespace run to a single space and trims
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Converts a file pattern with `*` wildcards into an unanchored regex
///
/// Every other character is matched literally.
pub fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&body).ok()
}

/// New-file line numbers of added lines containing `needle`
pub fn added_lines_containing(diff: &DiffResult, needle: &str) -> Vec<u32> {
    diff.added_lines()
        .filter(|(_, line)| line.contains(needle))
        .map(|(n, _)| n)
        .collect()
}

/// New-file line numbers of added lines matching `re`
pub fn added_lines_matching(diff: &DiffResult, re: &Regex) -> Vec<u32> {
    diff.added_lines()
        .filter(|(_, line)| re.is_match(line))
        .map(|(n, _)| n)
        .collect()
}

/// Formats a name list for messages: `"a", "b"`
pub fn quote_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::diff::diff;

    #[test]
    fn test_builtin_patterns_compile() {
        assert_eq!(IDENTIFIER_PATTERNS.len(), 4);
        assert_eq!(FUNCTION_PATTERNS.len(), 5);
    }

    #[test]
    fn test_extract_identifiers() {
        let names = extract_identifiers("const total = 1;\nlet mut count = 0;\nvalue = 3;\nfunction go() {}");
        assert!(names.contains("total"));
        assert!(names.contains("count"));
        assert!(names.contains("value"));
        assert!(names.contains("go"));
        assert!(!names.contains("mut"));
    }

    #[test]
    fn test_comparison_is_not_assignment() {
        let names = extract_identifiers("  ready == true\n  done => 1\n");
        assert!(names.is_empty());
    }

    #[test]
    fn test_extract_function_names() {
        let text = "function alpha() {}\nconst beta = () => 1;\ndef gamma(x):\nfn delta() {}\n  epsilon(a, b) {\n  if (x) {\n";
        let names = extract_function_names(text);
        for expected in ["alpha", "beta", "gamma", "delta", "epsilon"] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(!names.contains("if"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c\n"), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_glob_to_regex() {
        let re = glob_to_regex("src/*.ts").unwrap();
        assert!(re.is_match("src/index.ts"));
        assert!(re.is_match("/repo/src/deep/file.ts"));
        assert!(!re.is_match("lib/index.js"));

        let dotted = glob_to_regex("a.b*").unwrap();
        assert!(!dotted.is_match("axb"));
    }

    #[test]
    fn test_count_matches_zero_width() {
        let re = Regex::new(r"\b").unwrap();
        assert_eq!(count_matches(&re, "ab cd"), 4);
        let empty = Regex::new("").unwrap();
        assert_eq!(count_matches(&empty, "abc"), 4);
    }

    #[test]
    fn test_compile_user_pattern_invalid() {
        assert!(compile_user_pattern("[unclosed").is_none());
        assert!(compile_user_pattern("eval\\(").is_some());
    }

    #[test]
    fn test_added_lines_containing() {
        let result = diff("a\nb\n", "a\nlog(1)\nb\nlog(2)\n");
        assert_eq!(added_lines_containing(&result, "log"), vec![2, 4]);
    }
}
