#![forbid(unsafe_code)]

//! Dependency checker
//!
//! Import targets are pulled out of the added lines only, so dependencies the
//! original code already used are never reported.

use crate::rules::patterns::added_lines_containing;
use crate::rules::{DependencyRule, ExecutionContext, Rule, Violation};
use crate::types::Severity;
use regex::Regex;
use std::sync::LazyLock;

/// Module-path import syntaxes whose target is quoted
static QUOTED_IMPORTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"\bimport\s+(?:[\w$*{}\s,]+?\s+from\s+)?['"]([^'"\n]+)['"]"#,
        r#"\bexport\s+[\w$*{}\s,]+?\s+from\s+['"]([^'"\n]+)['"]"#,
        r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Dotted-module import syntaxes (`import os.path`, `from x import y`)
static MODULE_IMPORTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\s*import\s+([A-Za-z_][\w.]*)\s*(?:as\s+\w+\s*)?$",
        r"(?m)^\s*from\s+([A-Za-z_][\w.]*)\s+import\b",
    ]
    .into_iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Runtime modules that never count as new dependencies
const BUILTIN_MODULES: &[&str] = &[
    "fs",
    "path",
    "os",
    "util",
    "crypto",
    "http",
    "https",
    "events",
    "stream",
    "url",
    "child_process",
    "assert",
    "buffer",
    "sys",
    "re",
    "json",
];

/// A dependency named by newly added code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedPackage {
    /// Normalized package name (first path segment, scope marker stripped)
    pub name: String,

    /// The import target as written
    pub raw: String,
}

/// Extracts the non-relative, non-builtin packages imported by `text`
///
/// Results keep first-seen order and contain each package once.
pub fn extract_imports(text: &str) -> Vec<ImportedPackage> {
    let mut found: Vec<(usize, String, String)> = Vec::new();

    for re in QUOTED_IMPORTS.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1)
                && let Some(name) = package_from_path(m.as_str())
            {
                found.push((m.start(), name, m.as_str().to_string()));
            }
        }
    }
    for re in MODULE_IMPORTS.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1)
                && let Some(name) = package_from_module(m.as_str())
            {
                found.push((m.start(), name, m.as_str().to_string()));
            }
        }
    }

    found.sort_by_key(|(offset, _, _)| *offset);

    let mut packages: Vec<ImportedPackage> = Vec::new();
    for (_, name, raw) in found {
        if !packages.iter().any(|p| p.name == name) {
            packages.push(ImportedPackage { name, raw });
        }
    }
    packages
}

fn package_from_path(target: &str) -> Option<String> {
    let target = target.trim();
    if target.is_empty() || target.starts_with('.') || target.starts_with('/') {
        return None;
    }
    let target = target.strip_prefix("node:").unwrap_or(target);
    let first = target.split('/').next()?;
    let name = first.trim_start_matches('@');
    keep_if_external(name)
}

fn package_from_module(module: &str) -> Option<String> {
    let first = module.split('.').next()?;
    keep_if_external(first)
}

fn keep_if_external(name: &str) -> Option<String> {
    if name.is_empty() || BUILTIN_MODULES.contains(&name) {
        None
    } else {
        Some(name.to_string())
    }
}

/// True when `name` equals `entry` or lives under it (`entry/...`)
pub fn covered_by(name: &str, entry: &str) -> bool {
    let entry = entry.trim().trim_start_matches('@');
    !entry.is_empty() && (name == entry || name.starts_with(&format!("{}/", entry)))
}

/// Checks newly imported packages against the allow and deny lists
pub fn check(rule: &Rule, dependency: &DependencyRule, ctx: &ExecutionContext) -> Vec<Violation> {
    let imports = extract_imports(ctx.added_text);
    let mut violations = Vec::new();

    if let Some(allowed) = &dependency.allowed {
        for package in &imports {
            if !allowed.iter().any(|entry| covered_by(&package.name, entry)) {
                violations.push(violation(rule, ctx, package, "is not in the allowed list"));
            }
        }
    }

    if let Some(forbidden) = &dependency.forbidden {
        for package in &imports {
            if forbidden.iter().any(|entry| covered_by(&package.name, entry)) {
                violations.push(violation(rule, ctx, package, "is forbidden"));
            }
        }
    }

    violations
}

fn violation(rule: &Rule, ctx: &ExecutionContext, package: &ImportedPackage, reason: &str) -> Violation {
    Violation::new(
        rule,
        Severity::Error,
        format!("The dependency \"{}\" {}", package.name, reason),
    )
    .with_lines(added_lines_containing(ctx.diff, &package.raw))
}

/// Pulls the package name back out of a dependency violation's details
pub fn package_from_details(details: &str) -> Option<&str> {
    let rest = details.strip_prefix("The dependency \"")?;
    let end = rest.rfind("\" ")?;
    Some(&rest[..end])
}
