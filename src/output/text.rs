#![forbid(unsafe_code)]

//! Human-readable output formatter
//!
//! Writes through `termcolor` so the same code serves colored terminals and
//! plain buffers in tests.

use crate::engine::diff::ChangeKind;
use crate::output::FileReport;
use crate::rules::Violation;
use crate::types::Severity;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// Text output formatter
#[derive(Debug, Default)]
pub struct TextFormatter {
    /// Also list the diff groups
    pub verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        TextFormatter { verbose }
    }

    /// Writes one file report
    pub fn write(&self, out: &mut dyn WriteColor, report: &FileReport<'_>) -> io::Result<()> {
        let result = report.result;

        if let Some(name) = report.file_name {
            write_styled(out, ColorSpec::new().set_bold(true), name)?;
            writeln!(out)?;
        }

        if result.valid {
            write_styled(out, ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true), "PASSED")?;
        } else {
            write_styled(out, ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true), "FAILED")?;
        }
        writeln!(
            out,
            ": {} line(s) changed (+{} -{}), {} error(s), {} warning(s)",
            result.diff.total_lines_changed,
            result.diff.lines_added,
            result.diff.lines_removed,
            result.error_count(),
            result.warning_count()
        )?;

        if result.requires_approval {
            write_styled(out, ColorSpec::new().set_fg(Some(Color::Yellow)), "Requires human approval")?;
            writeln!(out)?;
        }

        if !result.violations.is_empty() {
            writeln!(out)?;
            for violation in &result.violations {
                self.write_violation(out, violation)?;
            }
        }

        if self.verbose && result.diff.has_changes() {
            writeln!(out)?;
            writeln!(out, "Diff:")?;
            self.write_diff(out, report)?;
        }

        Ok(())
    }

    /// Writes a batch, separated by blank lines, followed by a one-line total
    pub fn write_batch(&self, out: &mut dyn WriteColor, reports: &[FileReport<'_>]) -> io::Result<()> {
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.write(out, report)?;
        }

        let failed = reports.iter().filter(|r| !r.result.valid).count();
        writeln!(out)?;
        if failed == 0 {
            writeln!(out, "Check PASSED: {} file(s) checked", reports.len())
        } else {
            writeln!(
                out,
                "Check FAILED: {} of {} file(s) violate the policy",
                failed,
                reports.len()
            )
        }
    }

    fn write_violation(&self, out: &mut dyn WriteColor, violation: &Violation) -> io::Result<()> {
        let color = match violation.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };
        write!(out, "  ")?;
        write_styled(out, ColorSpec::new().set_fg(Some(color)), violation.severity.as_str())?;
        write!(out, " [{}] {}", violation.rule_kind, violation.description)?;
        if let Some(lines) = &violation.line_numbers {
            let lines: Vec<String> = lines.iter().map(u32::to_string).collect();
            write!(out, " (line {})", lines.join(", "))?;
        }
        writeln!(out)?;
        if let Some(details) = &violation.details {
            writeln!(out, "      {}", details)?;
        }
        Ok(())
    }

    fn write_diff(&self, out: &mut dyn WriteColor, report: &FileReport<'_>) -> io::Result<()> {
        for change in &report.result.diff.changes {
            let (prefix, color) = match change.kind {
                ChangeKind::Added => ('+', Some(Color::Green)),
                ChangeKind::Removed => ('-', Some(Color::Red)),
                ChangeKind::Unchanged => continue,
            };
            for (line, text) in change.numbered_lines() {
                out.set_color(ColorSpec::new().set_fg(color))?;
                write!(out, "{:>5} {} {}", line, prefix, text)?;
                out.reset()?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

fn write_styled(out: &mut dyn WriteColor, spec: &ColorSpec, text: &str) -> io::Result<()> {
    out.set_color(spec)?;
    write!(out, "{}", text)?;
    out.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlobalSettings, RuleSet};
    use crate::engine::{ValidationResult, evaluate};
    use crate::rules::{ContentRule, Rule};
    use termcolor::Buffer;

    fn render(formatter: &TextFormatter, report: &FileReport<'_>) -> String {
        let mut buffer = Buffer::no_color();
        formatter.write(&mut buffer, report).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    fn failing() -> ValidationResult {
        let rule_set = RuleSet {
            rules: vec![Rule::Content(ContentRule {
                description: Some("No console output".to_string()),
                forbid: Some(vec!["console.log".to_string()]),
                ..Default::default()
            })],
            global: GlobalSettings::default(),
        };
        evaluate("a\nb\n", "a\nconsole.log(b)\n", &rule_set, None, None)
    }

    #[test]
    fn test_failed_report() {
        let result = failing();
        let text = render(&TextFormatter::new(false), &FileReport::new(Some("app.js"), &result));

        assert!(text.starts_with("app.js\nFAILED: 2 line(s) changed (+1 -1), 1 error(s), 0 warning(s)\n"));
        assert!(text.contains("Requires human approval"));
        assert!(text.contains("  error [content] No console output (line 2)"));
        assert!(text.contains("      Forbidden content \"console.log\" was added"));
        assert!(!text.contains("Diff:"));
    }

    #[test]
    fn test_verbose_lists_diff() {
        let result = failing();
        let text = render(&TextFormatter::new(true), &FileReport::new(None, &result));
        assert!(text.contains("Diff:"));
        assert!(text.contains("    2 - b"));
        assert!(text.contains("    2 + console.log(b)"));
    }

    #[test]
    fn test_passed_report() {
        let rule_set = RuleSet {
            rules: vec![],
            global: GlobalSettings {
                require_approval_for_all: false,
                ..Default::default()
            },
        };
        let result = evaluate("same", "same", &rule_set, None, None);
        let text = render(&TextFormatter::default(), &FileReport::new(None, &result));
        assert_eq!(text, "PASSED: 0 line(s) changed (+0 -0), 0 error(s), 0 warning(s)\n");
    }

    #[test]
    fn test_batch_summary() {
        let result = failing();
        let reports = [
            FileReport::new(Some("a.js"), &result),
            FileReport::new(Some("b.js"), &result),
        ];
        let mut buffer = Buffer::no_color();
        TextFormatter::default().write_batch(&mut buffer, &reports).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.ends_with("Check FAILED: 2 of 2 file(s) violate the policy\n"));
    }
}
