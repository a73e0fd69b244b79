//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for reading inputs, resolving
//! the effective policy and printing reports.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::config::{Resolution, resolve_for_file};
use crate::error::InputError;
use crate::output::{FileReport, JsonFormatter, SarifFormatter, TextFormatter};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;
use termcolor::StandardStream;

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Reads an input file, mapping the error to the path that failed
pub(crate) fn read_input(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the optional original text; a missing argument means a new file
pub(crate) fn read_original(path: Option<&Path>) -> Result<String, InputError> {
    match path {
        Some(path) => read_input(path),
        None => Ok(String::new()),
    }
}

/// Resolves the effective policy for `file_name`
///
/// Warnings are already logged by the resolver; they are returned for
/// callers that want to report them differently.
pub(crate) fn resolve(workspace: &Path, file_name: &str) -> Resolution {
    let resolution = resolve_for_file(Path::new(file_name), workspace);
    tracing::debug!(
        file = file_name,
        rules = resolution.rule_set.rules.len(),
        overrides = resolution.applied_overrides.len(),
        "resolved policy"
    );
    resolution
}

/// Opens stdout for colored output according to the user's choice
pub(crate) fn stdout(color: ColorChoice) -> StandardStream {
    let choice = match color {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    };
    StandardStream::stdout(choice)
}

/// Prints a single report in the requested format
pub(crate) fn print_report(
    report: &FileReport<'_>,
    format: OutputFormat,
    verbose: bool,
    color: ColorChoice,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => TextFormatter::new(verbose).write(&mut stdout(color), report),
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new().format(report)?);
            Ok(())
        }
        OutputFormat::Sarif => {
            println!("{}", SarifFormatter::new().format(std::slice::from_ref(report))?);
            Ok(())
        }
    }
}

/// Prints a batch of reports in the requested format
pub(crate) fn print_batch(
    reports: &[FileReport<'_>],
    format: OutputFormat,
    verbose: bool,
    color: ColorChoice,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => TextFormatter::new(verbose).write_batch(&mut stdout(color), reports),
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new().format_batch(reports)?);
            Ok(())
        }
        OutputFormat::Sarif => {
            println!("{}", SarifFormatter::new().format(reports)?);
            Ok(())
        }
    }
}
