//! Parsing, validation and writing of policy documents
//!
//! A policy document is YAML with a `rules` list and optional `global`
//! settings. Override documents add `replace` and `disable`.

use crate::error::ConfigError;
use crate::rules::Rule;
use crate::types::RuleKind;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the base policy document at the workspace root
pub const POLICY_FILE_NAME: &str = ".diffwarden.yaml";

/// File name of a directory-scoped override document
pub const OVERRIDE_FILE_NAME: &str = ".diffwarden.override.yaml";

/// Path of the base policy document for `workspace`
pub fn policy_file(workspace: &Path) -> PathBuf {
    workspace.join(POLICY_FILE_NAME)
}

/// Settings that apply to every rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Every change needs human approval
    #[serde(default = "default_true", alias = "requireApprovalForAll")]
    pub require_approval_for_all: bool,

    /// Hosts should log every validation
    #[serde(default = "default_true", alias = "logAllInteractions")]
    pub log_all_interactions: bool,

    /// Treat every warning as an error
    #[serde(default, alias = "strictMode")]
    pub strict_mode: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            require_approval_for_all: true,
            log_all_interactions: true,
            strict_mode: false,
        }
    }
}

impl GlobalSettings {
    /// Returns these settings with every field set in `patch` replaced
    pub fn merged(self, patch: &GlobalPatch) -> Self {
        Self {
            require_approval_for_all: patch
                .require_approval_for_all
                .unwrap_or(self.require_approval_for_all),
            log_all_interactions: patch
                .log_all_interactions
                .unwrap_or(self.log_all_interactions),
            strict_mode: patch.strict_mode.unwrap_or(self.strict_mode),
        }
    }
}

/// Partial global settings, as written in override documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPatch {
    #[serde(default, alias = "requireApprovalForAll")]
    pub require_approval_for_all: Option<bool>,

    #[serde(default, alias = "logAllInteractions")]
    pub log_all_interactions: Option<bool>,

    #[serde(default, alias = "strictMode")]
    pub strict_mode: Option<bool>,
}

/// The effective policy for one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in declaration order
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub global: GlobalSettings,
}

impl RuleSet {
    /// Loads a base policy document strictly
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, is not valid YAML,
    /// fails the shape check, or has no `rules` list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a base policy document strictly
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(s)?;
        validate_rules_config(&value)?;
        if value.get("rules").is_none() {
            return Err(ConfigError::MissingField("rules".to_string()));
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Serializes the rule set as a policy document
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Writes the rule set to `path` as a policy document
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}

/// A directory-scoped policy fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    /// Discard everything inherited instead of merging
    #[serde(default)]
    pub replace: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// Rule kinds or description fragments to drop from the inherited rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disable: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalPatch>,
}

impl Override {
    /// Loads an override document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses an override document
    ///
    /// An empty document is a no-op override.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(s)?;
        if value.is_null() {
            return Ok(Override::default());
        }
        validate_rules_config(&value)?;
        if let Some(disable) = value.get("disable")
            && !disable
                .as_sequence()
                .is_some_and(|items| items.iter().all(Value::is_string))
        {
            return Err(ConfigError::Validation(
                "'disable' must be a list of strings".to_string(),
            ));
        }
        Ok(serde_yaml::from_value(value)?)
    }
}

const GLOBAL_KEYS: &[&str] = &[
    "require_approval_for_all",
    "log_all_interactions",
    "strict_mode",
    "requireApprovalForAll",
    "logAllInteractions",
    "strictMode",
];

/// Shape-checks a parsed policy document before it is accepted
///
/// The root must be a mapping; `rules`, when present, a list of mappings
/// whose `type` names a known rule kind; `global`, when present, a mapping
/// of known boolean settings.
pub fn validate_rules_config(value: &Value) -> Result<(), ConfigError> {
    let Some(root) = value.as_mapping() else {
        return Err(ConfigError::Validation(
            "Policy document must be a mapping".to_string(),
        ));
    };

    if let Some(rules) = root.get("rules") {
        let Some(rules) = rules.as_sequence() else {
            return Err(ConfigError::Validation("'rules' must be a list".to_string()));
        };
        for (index, rule) in rules.iter().enumerate() {
            if !rule.is_mapping() {
                return Err(ConfigError::Validation(format!(
                    "Rule #{} must be a mapping",
                    index + 1
                )));
            }
            let kind = rule.get("type").and_then(Value::as_str);
            match kind {
                Some(kind) if known_rule_type(kind) => {}
                Some(kind) => {
                    return Err(ConfigError::Validation(format!(
                        "Rule #{} has unknown type '{}'",
                        index + 1,
                        kind
                    )));
                }
                None => {
                    return Err(ConfigError::Validation(format!(
                        "Rule #{} is missing a string 'type'",
                        index + 1
                    )));
                }
            }
        }
    }

    if let Some(global) = root.get("global") {
        let Some(global) = global.as_mapping() else {
            return Err(ConfigError::Validation("'global' must be a mapping".to_string()));
        };
        for (key, setting) in global {
            let key = key.as_str().unwrap_or_default();
            if !GLOBAL_KEYS.contains(&key) {
                return Err(ConfigError::Validation(format!(
                    "Unknown global setting '{}'",
                    key
                )));
            }
            if !setting.is_bool() {
                return Err(ConfigError::Validation(format!(
                    "Global setting '{}' must be true or false",
                    key
                )));
            }
        }
    }

    Ok(())
}

fn known_rule_type(kind: &str) -> bool {
    [
        RuleKind::Scope,
        RuleKind::Refactor,
        RuleKind::Dependency,
        RuleKind::Content,
        RuleKind::Threshold,
    ]
    .iter()
    .any(|k| k.document_tag() == kind || k.as_str() == kind)
}
