//! Resolution of the effective rule set for a file
//!
//! Resolution never fails. A missing or broken base document yields the
//! default (empty) rule set, and a broken override is skipped; both are
//! reported as warnings on the [`Resolution`] and through `tracing`.

use crate::config::policy::{GlobalSettings, OVERRIDE_FILE_NAME, Override, POLICY_FILE_NAME, RuleSet};
use crate::error::ConfigError;
use crate::rules::Rule;
use std::path::{Component, Path, PathBuf};

/// A resolved rule set plus whatever went wrong on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub rule_set: RuleSet,

    /// Human-readable problems that were tolerated
    pub warnings: Vec<String>,

    /// Override documents that were applied, root first
    pub applied_overrides: Vec<PathBuf>,
}

impl Resolution {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Loads the base policy document, falling back to the default rule set
pub fn resolve_base(path: &Path) -> Resolution {
    let mut resolution = Resolution::default();

    if !path.exists() {
        resolution.warn(format!(
            "Policy file {} not found; using the default (empty) policy",
            path.display()
        ));
        return resolution;
    }

    match RuleSet::load(path) {
        Ok(rule_set) => resolution.rule_set = rule_set,
        Err(ConfigError::MissingField(field)) => resolution.warn(format!(
            "Policy file {} has no '{}' list; using the default (empty) policy",
            path.display(),
            field
        )),
        Err(e) => resolution.warn(format!(
            "Failed to load policy file {}: {}; using the default (empty) policy",
            path.display(),
            e
        )),
    }

    resolution
}

/// Resolves the effective rule set for `file_path`
///
/// Starts from `<workspace_root>/.diffwarden.yaml` and applies every override
/// document found between `workspace_root` and the file's directory, root
/// first. Relative file paths are taken relative to `workspace_root`.
pub fn resolve_for_file(file_path: &Path, workspace_root: &Path) -> Resolution {
    let mut resolution = resolve_base(&workspace_root.join(POLICY_FILE_NAME));

    for dir in override_directories(file_path, workspace_root, &mut resolution) {
        let candidate = dir.join(OVERRIDE_FILE_NAME);
        if !candidate.is_file() {
            continue;
        }
        match Override::load(&candidate) {
            Ok(ov) => {
                tracing::debug!(path = %candidate.display(), replace = ov.replace, "applying override");
                resolution.rule_set = apply_override(std::mem::take(&mut resolution.rule_set), &ov);
                resolution.applied_overrides.push(candidate);
            }
            Err(e) => resolution.warn(format!(
                "Skipping override {}: {}",
                candidate.display(),
                e
            )),
        }
    }

    resolution
}

/// Lists the directories from the workspace root down to the file's parent
fn override_directories(
    file_path: &Path,
    workspace_root: &Path,
    resolution: &mut Resolution,
) -> Vec<PathBuf> {
    // Both sides are made absolute so that `--workspace .` still matches an
    // absolute file path under the current directory.
    let root = lexical_absolute(workspace_root);
    let absolute = if file_path.is_absolute() {
        lexical_absolute(file_path)
    } else {
        lexical_absolute(&workspace_root.join(file_path))
    };

    let parent = absolute.parent().unwrap_or(&root);
    let relative = match parent.strip_prefix(&root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            resolution.warn(format!(
                "{} is outside the workspace {}; only workspace-level overrides apply",
                file_path.display(),
                workspace_root.display()
            ));
            PathBuf::new()
        }
    };

    let mut dirs = vec![workspace_root.to_path_buf()];
    let mut current = workspace_root.to_path_buf();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            current.push(part);
            dirs.push(current.clone());
        }
    }
    dirs
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem beyond reading the current directory
fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Applies one override to an accumulated rule set
///
/// In replace mode the accumulated rules are discarded and the globals start
/// again from the defaults. Otherwise rules matching a `disable` entry are
/// dropped, the override's rules are appended, and its globals win per field.
pub fn apply_override(base: RuleSet, ov: &Override) -> RuleSet {
    if ov.replace {
        let global = match &ov.global {
            Some(patch) => GlobalSettings::default().merged(patch),
            None => GlobalSettings::default(),
        };
        return RuleSet {
            rules: ov.rules.clone().unwrap_or_default(),
            global,
        };
    }

    let mut rules: Vec<Rule> = base
        .rules
        .into_iter()
        .filter(|rule| !is_disabled(rule, &ov.disable))
        .collect();
    if let Some(extra) = &ov.rules {
        rules.extend(extra.iter().cloned());
    }

    let global = match &ov.global {
        Some(patch) => base.global.merged(patch),
        None => base.global,
    };

    RuleSet { rules, global }
}

/// True when a `disable` entry names the rule's kind or appears in its description
fn is_disabled(rule: &Rule, disable: &[String]) -> bool {
    disable.iter().any(|entry| {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }
        if rule.kind().matches_name(entry) {
            return true;
        }
        rule.description()
            .is_some_and(|d| d.to_lowercase().contains(&entry.to_lowercase()))
    })
}
