//! Output formatters (text, JSON and SARIF)

pub mod json;
pub mod sarif;
pub mod text;

use crate::engine::ValidationResult;

pub use json::JsonFormatter;
pub use sarif::SarifFormatter;
pub use text::TextFormatter;

/// One evaluated file, as handed to a formatter
#[derive(Debug, Clone, Copy)]
pub struct FileReport<'a> {
    /// Name of the evaluated file, when known
    pub file_name: Option<&'a str>,

    pub result: &'a ValidationResult,
}

impl<'a> FileReport<'a> {
    pub fn new(file_name: Option<&'a str>, result: &'a ValidationResult) -> Self {
        FileReport { file_name, result }
    }
}
