//! Check command implementation
//!
//! This module implements the `diffwarden check` command, which:
//! - Reads the original and modified texts
//! - Resolves the effective policy for the file
//! - Evaluates the change
//! - Prints the result (text, JSON or SARIF)
//! - Returns the exit code

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{self, EXIT_FAILURE, EXIT_SUCCESS};
use crate::engine::evaluate;
use crate::error::InputError;
use crate::output::FileReport;
use std::path::{Path, PathBuf};

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Options for one `check` invocation
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub original: Option<PathBuf>,
    pub modified: PathBuf,
    pub file_name: Option<String>,
    pub files_changed: Option<u32>,
    pub format: OutputFormat,
    pub verbose: bool,
    pub color: ColorChoice,
}

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: the change satisfies the policy
/// - 1: the change violates the policy, or an input could not be read
pub fn run_check(workspace: &Path, options: &CheckOptions) -> i32 {
    match run_check_inner(workspace, options) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn run_check_inner(workspace: &Path, options: &CheckOptions) -> Result<bool, CheckError> {
    let original = common::read_original(options.original.as_deref())?;
    let modified = common::read_input(&options.modified)?;

    let file_name = options
        .file_name
        .clone()
        .unwrap_or_else(|| options.modified.display().to_string());

    let resolution = common::resolve(workspace, &file_name);
    let result = evaluate(
        &original,
        &modified,
        &resolution.rule_set,
        Some(&file_name),
        options.files_changed,
    );

    common::print_report(
        &FileReport::new(Some(&file_name), &result),
        options.format,
        options.verbose,
        options.color,
    )?;

    Ok(result.valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options(dir: &Path, format: OutputFormat) -> CheckOptions {
        CheckOptions {
            original: Some(dir.join("old.js")),
            modified: dir.join("new.js"),
            file_name: Some("app.js".to_string()),
            files_changed: None,
            format,
            verbose: false,
            color: ColorChoice::Never,
        }
    }

    #[test]
    fn test_check_passes_without_policy() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("old.js"), "a\n").unwrap();
        fs::write(dir.path().join("new.js"), "a\nb\n").unwrap();

        let valid = run_check_inner(dir.path(), &options(dir.path(), OutputFormat::Json)).unwrap();
        assert!(valid);
    }

    #[test]
    fn test_check_fails_on_forbidden_content() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".diffwarden.yaml"),
            "rules:\n  - type: content\n    forbid: [\"console.log\"]\n",
        )
        .unwrap();
        fs::write(dir.path().join("old.js"), "a\n").unwrap();
        fs::write(dir.path().join("new.js"), "a\nconsole.log(a)\n").unwrap();

        let code = run_check(dir.path(), &options(dir.path(), OutputFormat::Json));
        assert_eq!(code, EXIT_FAILURE);
    }

    #[test]
    fn test_check_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let err = run_check_inner(dir.path(), &options(dir.path(), OutputFormat::Text)).unwrap_err();
        assert!(matches!(err, CheckError::Input(InputError::Read { .. })));
    }
}
