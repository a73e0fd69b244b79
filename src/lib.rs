#![forbid(unsafe_code)]

//! Diffwarden: a policy gate for changes written by coding agents
//!
//! Diffwarden compares the text of a file before and after a change, checks
//! the change against a YAML policy of scope, refactor, dependency, content
//! and threshold rules, and reports violations. Approved changes can relax
//! the policy so the same finding is not reported again.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, DiffwardenError, InputError};

// Re-export the core API for convenient access
pub use config::{Resolution, RuleSet, resolve_for_file};
pub use engine::{DiffResult, ValidationResult, apply_approved_exceptions, diff, evaluate};
pub use rules::{Rule, Violation};
pub use types::{ActionTag, RuleKind, Severity};
