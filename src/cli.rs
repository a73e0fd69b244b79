//! CLI argument parsing and command dispatch

pub mod approve;
pub mod args;
pub mod check;
pub mod common;
pub mod git;
pub mod init;
pub mod validate;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice, Command, OutputFormat};
pub use approve::ApproveOptions;
pub use check::CheckOptions;
pub use git::GitOptions;
