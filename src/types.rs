#![forbid(unsafe_code)]

//! Core domain types for Diffwarden
//!
//! This module defines the small closed vocabularies shared by the rule model,
//! the evaluator and the output formatters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Violation severity levels
///
/// Only `Error` violations make a change invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Returns the severity as a lowercase string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five kinds of policy rule
///
/// The string form is the `ruleKind` reported on violations and used as the
/// SARIF `ruleId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Scope,
    Refactor,
    Dependency,
    Content,
    Threshold,
}

impl RuleKind {
    /// Returns the kind name reported on violations
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Scope => "scope",
            RuleKind::Refactor => "refactor",
            RuleKind::Dependency => "dependency",
            RuleKind::Content => "content",
            RuleKind::Threshold => "threshold",
        }
    }

    /// Returns the `type` tag used for this kind in policy documents
    pub fn document_tag(&self) -> &'static str {
        match self {
            RuleKind::Dependency => "dependencies",
            other => other.as_str(),
        }
    }

    /// Matches a name against this kind, accepting both the kind name and the
    /// document tag (`dependency` / `dependencies`)
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        name.eq_ignore_ascii_case(self.as_str()) || name.eq_ignore_ascii_case(self.document_tag())
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refactoring actions a refactor rule can forbid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTag {
    VariableRenames,
    AddErrorHandling,
    AddComments,
    ChangeFormatting,
}

impl ActionTag {
    /// Returns the tag as written in policy documents
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::VariableRenames => "variable_renames",
            ActionTag::AddErrorHandling => "add_error_handling",
            ActionTag::AddComments => "add_comments",
            ActionTag::ChangeFormatting => "change_formatting",
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
