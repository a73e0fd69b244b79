//! Initialize a diffwarden workspace
//!
//! Writes a commented starter policy document at the workspace root.

use crate::config::POLICY_FILE_NAME;
use std::fs;
use std::path::Path;

/// Default content for .diffwarden.yaml
pub(crate) const DEFAULT_POLICY_YAML: &str = r#"# Diffwarden policy
#
# Rules are checked in order against every change. Place a
# .diffwarden.override.yaml in any directory to adjust the policy for the
# files beneath it (keys: rules, disable, replace, global).

rules:
  - type: content
    description: No debug output in new code
    forbid:
      - console.log
      - debugger
    # patterns:
    #   deny: ['eval\(']
    # require: use_existing_only

  - type: dependencies
    description: Keep the dependency surface stable
    forbidden:
      - moment
    # allowed: [lodash, react]

  - type: threshold
    description: Keep changes reviewable
    max_lines_changed: 200
    require_approval: true
    # max_files_changed: 10

  # - type: refactor
  #   forbid: [variable_renames, add_comments, change_formatting]

  # - type: scope
  #   description: Only touch the API layer
  #   files: ["src/api/*"]

global:
  require_approval_for_all: false
  log_all_interactions: true
  strict_mode: false
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path error
    #[error("Path error: {0}")]
    Path(String),
}

/// What init did with the policy document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Skipped,
    Overwritten,
}

/// Run the init command
///
/// # Arguments
/// * `workspace` - Directory that receives the policy document
/// * `force` - Overwrite an existing policy document
///
/// # Returns
/// * `Ok(InitOutcome)` - Whether the file was created, skipped or overwritten
/// * `Err(InitError)` - If the workspace is missing or an I/O error occurred
pub fn run_init(workspace: &Path, force: bool) -> Result<InitOutcome, InitError> {
    if !workspace.is_dir() {
        return Err(InitError::Path(format!(
            "Workspace '{}' is not a directory",
            workspace.display()
        )));
    }

    let path = workspace.join(POLICY_FILE_NAME);
    let outcome = if path.exists() {
        if !force {
            return Ok(InitOutcome::Skipped);
        }
        InitOutcome::Overwritten
    } else {
        InitOutcome::Created
    };

    fs::write(&path, DEFAULT_POLICY_YAML)?;
    Ok(outcome)
}
