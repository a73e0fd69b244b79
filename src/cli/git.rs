//! Git command implementation
//!
//! Evaluates every file changed relative to `HEAD`. The original text comes
//! from `HEAD`, the modified text from the index (`--staged`) or the working
//! tree. Files are evaluated in parallel, each against its own resolved
//! policy, with the number of changed files as the batch size.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{self, EXIT_FAILURE, EXIT_SUCCESS};
use crate::engine::{ValidationResult, evaluate};
use crate::error::InputError;
use crate::output::FileReport;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Error type specific to git command
#[derive(Debug, thiserror::Error)]
pub(crate) enum GitError {
    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Options for one `git` invocation
#[derive(Debug, Clone)]
pub struct GitOptions {
    pub staged: bool,
    pub paths: Vec<String>,
    pub format: OutputFormat,
    pub verbose: bool,
    pub color: ColorChoice,
}

/// One changed file and its evaluation
#[derive(Debug)]
pub struct EvaluatedFile {
    /// Path relative to the repository root
    pub path: String,
    pub result: ValidationResult,
}

/// Run the git command
///
/// Returns 0 when every changed file satisfies its policy, 1 otherwise or
/// when git could not be queried.
pub fn run_git(workspace: &Path, options: &GitOptions) -> i32 {
    match run_git_inner(workspace, options) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn run_git_inner(workspace: &Path, options: &GitOptions) -> Result<bool, GitError> {
    let files = evaluate_changes(workspace, options.staged, &options.paths)?;

    if files.is_empty() && options.format == OutputFormat::Text {
        eprintln!("No changed files found.");
        return Ok(true);
    }

    let reports: Vec<FileReport> = files
        .iter()
        .map(|f| FileReport::new(Some(&f.path), &f.result))
        .collect();
    common::print_batch(&reports, options.format, options.verbose, options.color)?;

    Ok(files.iter().all(|f| f.result.valid))
}

/// Evaluates every changed file under `workspace`
///
/// # Errors
///
/// Returns `InputError::Git` if git is unavailable, `workspace` is not inside
/// a repository, or the diff cannot be listed.
pub fn evaluate_changes(
    workspace: &Path,
    staged: bool,
    paths: &[String],
) -> Result<Vec<EvaluatedFile>, InputError> {
    let root = PathBuf::from(git(workspace, &["rev-parse", "--show-toplevel"])?.trim());

    let mut args = vec!["diff", "--name-only"];
    if staged {
        args.push("--cached");
    }
    args.push("HEAD");
    args.push("--");
    args.extend(paths.iter().map(String::as_str));

    let changed = parse_name_only(&git(workspace, &args)?);
    let batch_size = u32::try_from(changed.len()).unwrap_or(u32::MAX);
    tracing::debug!(count = changed.len(), staged, "changed files listed");

    changed
        .into_par_iter()
        .map(|path| -> Result<EvaluatedFile, InputError> {
            let original = git_show(&root, &format!("HEAD:{}", path))?.unwrap_or_default();
            let modified = if staged {
                git_show(&root, &format!(":{}", path))?.unwrap_or_default()
            } else {
                read_working_copy(&root.join(&path))?
            };

            let resolution = common::resolve(&root, &path);
            let result = evaluate(
                &original,
                &modified,
                &resolution.rule_set,
                Some(&path),
                Some(batch_size),
            );
            Ok(EvaluatedFile { path, result })
        })
        .collect()
}

/// Splits `git diff --name-only` output into paths
fn parse_name_only(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs git in `dir` and returns its stdout
fn git(dir: &Path, args: &[&str]) -> Result<String, InputError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| InputError::Git {
            command: args.join(" "),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(InputError::Git {
            command: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Reads a blob with `git show`; `None` when the object does not exist
fn git_show(root: &Path, object: &str) -> Result<Option<String>, InputError> {
    match git(root, &["show", object]) {
        Ok(text) => Ok(Some(text)),
        Err(InputError::Git { message, .. }) => {
            tracing::debug!(object, %message, "object not found, treating as empty");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Reads a working-tree file; a deleted file reads as empty
fn read_working_copy(path: &Path) -> Result<String, InputError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(InputError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
