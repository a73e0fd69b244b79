//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for evaluation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON object (an array for batches)
    Json,
    /// SARIF 2.1.0 log for code-scanning tools
    Sarif,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stdout is a terminal
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Diffwarden CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "diffwarden")]
#[command(about = "Policy gate for changes written by coding agents")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Workspace root holding the base policy document
    #[arg(long, short = 'w', global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Available diffwarden subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one change given as two files
    Check {
        /// Text before the change (omit for a new file)
        #[arg(long)]
        original: Option<PathBuf>,

        /// Text after the change
        #[arg(long)]
        modified: PathBuf,

        /// File name used for policy resolution and scope rules
        /// (defaults to the modified path)
        #[arg(long)]
        file_name: Option<String>,

        /// Number of files changed in the surrounding batch
        #[arg(long)]
        files_changed: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also print the diff
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate every file changed in the git working tree
    Git {
        /// Compare the index instead of the working tree against HEAD
        #[arg(long)]
        staged: bool,

        /// Limit the check to these paths
        paths: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Also print the diff of each file
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a starter policy document
    Init {
        /// Overwrite an existing policy document
        #[arg(long)]
        force: bool,
    },

    /// Strictly load a policy document and summarize its rules
    Validate {
        /// Policy document (defaults to the workspace policy)
        path: Option<PathBuf>,
    },

    /// Approve a change and relax the base policy so it passes next time
    Approve {
        /// Text before the change (omit for a new file)
        #[arg(long)]
        original: Option<PathBuf>,

        /// Text after the change
        #[arg(long)]
        modified: PathBuf,

        /// File name used for policy resolution (defaults to the modified path)
        #[arg(long)]
        file_name: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_minimal() {
        let cli = Cli::parse_from(["diffwarden", "check", "--modified", "new.ts"]);
        match cli.command {
            Command::Check {
                original,
                modified,
                file_name,
                files_changed,
                format,
                verbose,
            } => {
                assert_eq!(original, None);
                assert_eq!(modified, PathBuf::from("new.ts"));
                assert_eq!(file_name, None);
                assert_eq!(files_changed, None);
                assert_eq!(format, OutputFormat::Text);
                assert!(!verbose);
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_check_full() {
        let cli = Cli::parse_from([
            "diffwarden",
            "check",
            "--original",
            "old.ts",
            "--modified",
            "new.ts",
            "--file-name",
            "src/api.ts",
            "--files-changed",
            "4",
            "-f",
            "sarif",
            "-v",
        ]);
        match cli.command {
            Command::Check {
                original,
                file_name,
                files_changed,
                format,
                verbose,
                ..
            } => {
                assert_eq!(original, Some(PathBuf::from("old.ts")));
                assert_eq!(file_name, Some("src/api.ts".to_string()));
                assert_eq!(files_changed, Some(4));
                assert_eq!(format, OutputFormat::Sarif);
                assert!(verbose);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_requires_modified() {
        assert!(Cli::try_parse_from(["diffwarden", "check", "--original", "a"]).is_err());
    }

    #[test]
    fn test_git_args() {
        let cli = Cli::parse_from(["diffwarden", "git", "--staged", "src/", "-f", "json"]);
        match cli.command {
            Command::Git {
                staged,
                paths,
                format,
                verbose,
            } => {
                assert!(staged);
                assert_eq!(paths, vec!["src/"]);
                assert_eq!(format, OutputFormat::Json);
                assert!(!verbose);
            }
            _ => panic!("Expected Git command"),
        }
    }

    #[test]
    fn test_init_with_force() {
        let cli = Cli::parse_from(["diffwarden", "init", "--force"]);
        match cli.command {
            Command::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_validate_path_optional() {
        let cli = Cli::parse_from(["diffwarden", "validate"]);
        assert!(matches!(cli.command, Command::Validate { path: None }));

        let cli = Cli::parse_from(["diffwarden", "validate", "policy.yaml"]);
        match cli.command {
            Command::Validate { path } => assert_eq!(path, Some(PathBuf::from("policy.yaml"))),
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["diffwarden", "init", "--workspace", "/repo", "--color", "never"]);
        assert_eq!(cli.workspace, PathBuf::from("/repo"));
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn test_invalid_format() {
        let result = Cli::try_parse_from(["diffwarden", "check", "--modified", "x", "-f", "jsonl"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_contains_about() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("Policy gate"));
    }
}
