//! Policy resolution over real directory trees

mod common;

use common::write_file;
use diffwarden::config::{RuleSet, resolve_for_file};
use diffwarden::{Rule, RuleKind, evaluate};
use std::path::Path;
use tempfile::TempDir;

const BASE: &str = r#"
rules:
  - type: content
    description: No console output
    forbid: [console.log]
  - type: threshold
    max_lines_changed: 50
global:
  require_approval_for_all: false
"#;

fn kinds(rules: &[Rule]) -> Vec<RuleKind> {
    rules.iter().map(Rule::kind).collect()
}

#[test]
fn test_base_only() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);

    let resolution = resolve_for_file(Path::new("src/app.js"), dir.path());
    assert!(resolution.warnings.is_empty());
    assert!(resolution.applied_overrides.is_empty());
    assert_eq!(
        kinds(&resolution.rule_set.rules),
        vec![RuleKind::Content, RuleKind::Threshold]
    );
}

#[test]
fn test_missing_base_uses_default() {
    let dir = TempDir::new().unwrap();
    let resolution = resolve_for_file(Path::new("a.js"), dir.path());
    assert_eq!(resolution.rule_set, RuleSet::default());
    assert_eq!(resolution.warnings.len(), 1);
}

#[test]
fn test_unparsable_base_uses_default() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", "rules: [unterminated");

    let resolution = resolve_for_file(Path::new("a.js"), dir.path());
    assert!(resolution.rule_set.rules.is_empty());
    assert!(resolution.rule_set.global.require_approval_for_all);
    assert_eq!(resolution.warnings.len(), 1);
}

#[test]
fn test_unknown_rule_type_uses_default() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", "rules:\n  - type: vibes\n");

    let resolution = resolve_for_file(Path::new("a.js"), dir.path());
    assert!(resolution.rule_set.rules.is_empty());
    assert!(resolution.warnings[0].contains("vibes"));
}

#[test]
fn test_merge_override_disables_and_appends() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);
    write_file(
        dir.path(),
        "scripts/.diffwarden.override.yaml",
        "disable: [content]\nrules:\n  - type: dependencies\n    forbidden: [moment]\n",
    );

    let resolution = resolve_for_file(Path::new("scripts/build.js"), dir.path());
    assert_eq!(
        kinds(&resolution.rule_set.rules),
        vec![RuleKind::Threshold, RuleKind::Dependency]
    );
    assert_eq!(resolution.applied_overrides.len(), 1);

    // Files outside the override's directory keep the base policy
    let other = resolve_for_file(Path::new("src/app.js"), dir.path());
    assert_eq!(
        kinds(&other.rule_set.rules),
        vec![RuleKind::Content, RuleKind::Threshold]
    );

    // console.log is now allowed under scripts/
    let result = evaluate("", "console.log(1);\n", &resolution.rule_set, None, None);
    assert!(result.valid);
}

#[test]
fn test_replace_override_discards_base() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);
    write_file(
        dir.path(),
        "vendor/.diffwarden.override.yaml",
        "replace: true\ndisable: [threshold]\nglobal:\n  strict_mode: true\n",
    );

    let resolution = resolve_for_file(Path::new("vendor/lib/x.js"), dir.path());
    assert!(resolution.rule_set.rules.is_empty());
    assert!(resolution.rule_set.global.strict_mode);
    // Replace starts again from the defaults, not from the base globals
    assert!(resolution.rule_set.global.require_approval_for_all);
}

#[test]
fn test_overrides_apply_root_first() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);
    write_file(
        dir.path(),
        ".diffwarden.override.yaml",
        "rules:\n  - type: refactor\n    forbid: [add_comments]\n",
    );
    write_file(
        dir.path(),
        "src/.diffwarden.override.yaml",
        "disable: [refactor]\n",
    );
    write_file(
        dir.path(),
        "src/legacy/.diffwarden.override.yaml",
        "rules:\n  - type: dependencies\n    allowed: [lodash]\n",
    );

    let resolution = resolve_for_file(Path::new("src/legacy/old.js"), dir.path());
    assert_eq!(resolution.applied_overrides.len(), 3);
    assert_eq!(
        kinds(&resolution.rule_set.rules),
        vec![RuleKind::Content, RuleKind::Threshold, RuleKind::Dependency]
    );
}

#[test]
fn test_broken_override_skipped() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);
    write_file(dir.path(), "a/.diffwarden.override.yaml", "disable: content\n");
    write_file(
        dir.path(),
        "a/b/.diffwarden.override.yaml",
        "rules:\n  - type: dependencies\n    forbidden: [moment]\n",
    );

    let resolution = resolve_for_file(Path::new("a/b/c.js"), dir.path());
    assert_eq!(resolution.warnings.len(), 1);
    assert_eq!(resolution.applied_overrides.len(), 1);
    assert_eq!(
        kinds(&resolution.rule_set.rules),
        vec![RuleKind::Content, RuleKind::Threshold, RuleKind::Dependency]
    );
}

#[test]
fn test_absolute_file_path_inside_workspace() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), ".diffwarden.yaml", BASE);
    write_file(dir.path(), "pkg/.diffwarden.override.yaml", "disable: [threshold]\n");

    let absolute = dir.path().join("pkg").join("index.js");
    let resolution = resolve_for_file(&absolute, dir.path());
    assert_eq!(kinds(&resolution.rule_set.rules), vec![RuleKind::Content]);
}
