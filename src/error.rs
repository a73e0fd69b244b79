//! Error types for Diffwarden
//!
//! Evaluation itself never fails. Errors only arise while reading or writing
//! policy documents and while gathering inputs for the CLI.

use std::path::PathBuf;

/// Policy document errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading or writing a policy document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML syntax or type error
    #[error("Invalid policy syntax: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Document parsed but failed the shape check
    #[error("Invalid policy document: {0}")]
    Validation(String),

    /// Document has no `rules` list
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors raised while collecting the inputs of an evaluation
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Input file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A git command failed
    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },
}

/// Top-level error type for Diffwarden
#[derive(Debug, thiserror::Error)]
pub enum DiffwardenError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input error
    #[error("Input error: {0}")]
    Input(#[from] InputError),
}
