//! Approve command implementation
//!
//! Evaluates a change a human has signed off on, then relaxes the base
//! policy so its dependency and content findings are not reported again.
//! Only the base policy document is rewritten; override documents are left
//! as they are.

use crate::cli::common::{self, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{RuleSet, policy_file};
use crate::engine::{ExceptionOutcome, apply_approved_exceptions, evaluate};
use crate::error::DiffwardenError;
use crate::rules::Violation;
use std::path::{Path, PathBuf};

/// Options for one `approve` invocation
#[derive(Debug, Clone)]
pub struct ApproveOptions {
    pub original: Option<PathBuf>,
    pub modified: PathBuf,
    pub file_name: Option<String>,
}

/// Run the approve command
///
/// Returns 0 when the approval was recorded (including when nothing had to
/// change), 1 when an input or the policy could not be read or written.
pub fn run_approve(workspace: &Path, options: &ApproveOptions) -> i32 {
    match approve(workspace, options) {
        Ok(outcome) => {
            if outcome.mutated {
                println!("Updated {}:", policy_file(workspace).display());
                for edit in &outcome.edits {
                    println!("  {}", edit);
                }
            } else {
                println!("No policy changes needed.");
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Evaluates the change and writes the relaxed base policy
pub(crate) fn approve(
    workspace: &Path,
    options: &ApproveOptions,
) -> Result<ExceptionOutcome, DiffwardenError> {
    let original = common::read_original(options.original.as_deref())?;
    let modified = common::read_input(&options.modified)?;
    let file_name = options
        .file_name
        .clone()
        .unwrap_or_else(|| options.modified.display().to_string());

    let resolution = common::resolve(workspace, &file_name);
    let result = evaluate(&original, &modified, &resolution.rule_set, Some(&file_name), None);
    if result.violations.is_empty() {
        return Ok(ExceptionOutcome::default());
    }

    // The base document is loaded strictly: rewriting a file that failed to
    // parse would discard whatever the author wrote.
    let policy_path = policy_file(workspace);
    let mut base = RuleSet::load(&policy_path)?;
    let (learnable, from_overrides): (Vec<Violation>, Vec<Violation>) = result
        .violations
        .into_iter()
        .partition(|v| base.rules.contains(&v.rule));
    if !from_overrides.is_empty() {
        tracing::warn!(
            count = from_overrides.len(),
            "violations raised by directory overrides are not relaxed"
        );
    }
    let outcome = apply_approved_exceptions(&mut base, &learnable);

    if outcome.mutated {
        base.save(&policy_path)?;
        tracing::info!(
            path = %policy_path.display(),
            edits = outcome.edits.len(),
            "policy relaxed after approval"
        );
    }
    Ok(outcome)
}
