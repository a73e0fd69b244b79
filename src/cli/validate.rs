//! Validate command implementation
//!
//! Loads a policy or override document strictly, without the fallbacks the
//! resolver applies, and summarizes what it contains.

use crate::cli::common::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{GlobalSettings, OVERRIDE_FILE_NAME, Override, RuleSet};
use crate::error::ConfigError;
use crate::rules::Rule;
use std::fmt::Write as _;
use std::path::Path;

/// Run the validate command
///
/// Returns 0 when the document is valid, 1 otherwise.
pub fn run_validate(path: &Path) -> i32 {
    match summarize(path) {
        Ok(summary) => {
            print!("{}", summary);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            EXIT_FAILURE
        }
    }
}

/// Loads the document at `path` and renders a summary of it
///
/// Files named like an override document are parsed as one.
pub(crate) fn summarize(path: &Path) -> Result<String, ConfigError> {
    let is_override = path
        .file_name()
        .is_some_and(|name| name == OVERRIDE_FILE_NAME);

    let mut out = String::new();
    if is_override {
        let ov = Override::load(path)?;
        let rules = ov.rules.as_deref().unwrap_or_default();
        let _ = writeln!(
            out,
            "Override {} is valid: {} rule(s), {}",
            path.display(),
            rules.len(),
            if ov.replace { "replaces inherited rules" } else { "merges into inherited rules" }
        );
        write_rules(&mut out, rules);
        if !ov.disable.is_empty() {
            let _ = writeln!(out, "  disables: {}", ov.disable.join(", "));
        }
    } else {
        let rule_set = RuleSet::load(path)?;
        let _ = writeln!(
            out,
            "Policy {} is valid: {} rule(s)",
            path.display(),
            rule_set.rules.len()
        );
        write_rules(&mut out, &rule_set.rules);
        write_global(&mut out, &rule_set.global);
    }
    Ok(out)
}

fn write_rules(out: &mut String, rules: &[Rule]) {
    for (index, rule) in rules.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. [{}] {}",
            index + 1,
            rule.kind(),
            rule.display_description()
        );
    }
}

fn write_global(out: &mut String, global: &GlobalSettings) {
    let _ = writeln!(
        out,
        "  global: require_approval_for_all={} log_all_interactions={} strict_mode={}",
        global.require_approval_for_all, global.log_all_interactions, global.strict_mode
    );
}
