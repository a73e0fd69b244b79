#![forbid(unsafe_code)]

//! Rule model and the per-kind checkers

pub mod content;
pub mod dependency;
pub mod patterns;
pub mod refactor;
mod rule;
pub mod scope;
pub mod threshold;

// Re-export core types
pub use rule::{
    ContentRule, DependencyRule, ExecutionContext, RefactorRule, Rule, ScopeRule, ThresholdRule,
    Violation,
};
