//! Diffing, rule evaluation and exception learning

pub mod diff;
pub mod evaluator;
pub mod exceptions;

pub use diff::{ChangeKind, DiffChange, DiffResult, diff};
pub use evaluator::{ValidationResult, evaluate};
pub use exceptions::{EditAction, ExceptionEdit, ExceptionOutcome, apply_approved_exceptions};
