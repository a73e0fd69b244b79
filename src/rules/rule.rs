#![forbid(unsafe_code)]

//! Rule model: the closed set of policy variants and the violations they produce

use crate::engine::diff::DiffResult;
use crate::types::{ActionTag, RuleKind, Severity};
use serde::{Deserialize, Serialize};

/// A single policy entry
///
/// Documents tag each rule with `type`. Declaration order is significant and is
/// preserved into violation ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule {
    Scope(ScopeRule),
    Refactor(RefactorRule),
    #[serde(rename = "dependencies", alias = "dependency")]
    Dependency(DependencyRule),
    Content(ContentRule),
    Threshold(ThresholdRule),
}

impl Rule {
    /// Returns the kind of this rule
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Scope(_) => RuleKind::Scope,
            Rule::Refactor(_) => RuleKind::Refactor,
            Rule::Dependency(_) => RuleKind::Dependency,
            Rule::Content(_) => RuleKind::Content,
            Rule::Threshold(_) => RuleKind::Threshold,
        }
    }

    /// Returns the author-supplied description, if any
    pub fn description(&self) -> Option<&str> {
        let description = match self {
            Rule::Scope(rule) => Some(rule.description.as_str()),
            Rule::Refactor(rule) => rule.description.as_deref(),
            Rule::Dependency(rule) => rule.description.as_deref(),
            Rule::Content(rule) => rule.description.as_deref(),
            Rule::Threshold(rule) => rule.description.as_deref(),
        };
        description.filter(|d| !d.trim().is_empty())
    }

    /// Returns the description, or a generic label when none was written
    pub fn display_description(&self) -> String {
        match self.description() {
            Some(description) => description.to_string(),
            None => format!("{} rule", self.kind()),
        }
    }
}

/// Restricts which files, functions or regions a change may touch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRule {
    #[serde(default)]
    pub description: String,

    /// Regex that must already occur in the original text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// File patterns (`*` globs or substrings) the change must fall under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Function names that must exist in the original text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<String>>,
}

/// Forbids classes of refactoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub forbid: Vec<ActionTag>,
}

/// Constrains which packages new imports may reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden: Option<Vec<String>>,
}

/// Forbids literals and patterns in newly written code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContentRuleDocument", into = "ContentRuleDocument")]
pub struct ContentRule {
    pub description: Option<String>,

    /// Special requirement such as `use_existing_only`
    pub require: Option<String>,

    /// Literals that may not be introduced
    pub forbid: Option<Vec<String>>,

    pub patterns_allow: Option<Vec<String>>,

    /// Regexes whose match count may not grow
    pub patterns_deny: Option<Vec<String>>,
}

impl ContentRule {
    /// True when `require` asks for reuse of existing functions only
    pub fn requires_existing_only(&self) -> bool {
        matches!(
            self.require.as_deref(),
            Some("use_existing_only") | Some("use_existing_patterns_only")
        )
    }
}

/// On-disk form of a content rule
///
/// Patterns are written nested (`patterns: { allow, deny }`); the flat
/// `patterns_allow` / `patterns_deny` spellings are accepted on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ContentRuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    require: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    forbid: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    patterns: Option<ContentPatterns>,

    #[serde(default, alias = "patternsAllow", skip_serializing)]
    patterns_allow: Option<Vec<String>>,

    #[serde(default, alias = "patternsDeny", skip_serializing)]
    patterns_deny: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ContentPatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allow: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    deny: Option<Vec<String>>,
}

impl From<ContentRuleDocument> for ContentRule {
    fn from(doc: ContentRuleDocument) -> Self {
        let (nested_allow, nested_deny) = match doc.patterns {
            Some(patterns) => (patterns.allow, patterns.deny),
            None => (None, None),
        };
        ContentRule {
            description: doc.description,
            require: doc.require,
            forbid: doc.forbid,
            patterns_allow: merge_lists(nested_allow, doc.patterns_allow),
            patterns_deny: merge_lists(nested_deny, doc.patterns_deny),
        }
    }
}

impl From<ContentRule> for ContentRuleDocument {
    fn from(rule: ContentRule) -> Self {
        let patterns = if rule.patterns_allow.is_some() || rule.patterns_deny.is_some() {
            Some(ContentPatterns {
                allow: rule.patterns_allow,
                deny: rule.patterns_deny,
            })
        } else {
            None
        };
        ContentRuleDocument {
            description: rule.description,
            require: rule.require,
            forbid: rule.forbid,
            patterns,
            patterns_allow: None,
            patterns_deny: None,
        }
    }
}

fn merge_lists(first: Option<Vec<String>>, second: Option<Vec<String>>) -> Option<Vec<String>> {
    match (first, second) {
        (Some(mut a), Some(b)) => {
            for item in b {
                if !a.contains(&item) {
                    a.push(item);
                }
            }
            Some(a)
        }
        (a, b) => a.or(b),
    }
}

/// Caps the size of a change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        alias = "maxLinesChanged",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_lines_changed: Option<u32>,

    #[serde(
        default,
        alias = "maxFilesChanged",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_files_changed: Option<u32>,

    #[serde(default, alias = "requireApproval")]
    pub require_approval: bool,
}

/// A single detected policy breach
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The rule that produced this violation
    pub rule: Rule,

    /// Kind of the producing rule
    pub rule_kind: RuleKind,

    /// Description of the producing rule
    pub description: String,

    pub severity: Severity,

    /// Human-readable detail of what was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// New-file line numbers of the offending lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_numbers: Option<Vec<u32>>,
}

impl Violation {
    /// Creates a violation for `rule` with the rule's description
    pub fn new(rule: &Rule, severity: Severity, details: impl Into<String>) -> Self {
        Violation {
            rule: rule.clone(),
            rule_kind: rule.kind(),
            description: rule.display_description(),
            severity,
            details: Some(details.into()),
            line_numbers: None,
        }
    }

    /// Attaches line numbers, dropping an empty list
    pub fn with_lines(mut self, lines: Vec<u32>) -> Self {
        self.line_numbers = if lines.is_empty() { None } else { Some(lines) };
        self
    }

    /// Returns the details if present, the description otherwise
    pub fn message(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.description)
    }
}

/// Everything a checker needs to judge one change
///
/// Checkers never mutate the context; the evaluator builds one per call.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    /// Text before the change
    pub original: &'a str,

    /// Text after the change
    pub modified: &'a str,

    /// Line diff between the two
    pub diff: &'a DiffResult,

    /// Concatenated added lines, computed once for all checkers
    pub added_text: &'a str,

    /// Concatenated removed lines
    pub removed_text: &'a str,

    /// Name of the file being changed, when known
    pub file_name: Option<&'a str>,

    /// Number of files changed in the surrounding batch, when known
    pub files_changed_in_batch: Option<u32>,
}
