//! Diffwarden CLI entry point

use clap::Parser;
use diffwarden::cli::init::InitOutcome;
use diffwarden::cli::{ApproveOptions, CheckOptions, Command, GitOptions, args::Cli};
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter
const LOG_ENV: &str = "DIFFWARDEN_LOG";

fn main() {
    // Logs go to stderr so JSON and SARIF on stdout stay parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let workspace = cli.workspace;

    let exit_code = match cli.command {
        Command::Check {
            original,
            modified,
            file_name,
            files_changed,
            format,
            verbose,
        } => diffwarden::cli::check::run_check(
            &workspace,
            &CheckOptions {
                original,
                modified,
                file_name,
                files_changed,
                format,
                verbose,
                color: cli.color,
            },
        ),
        Command::Git {
            staged,
            paths,
            format,
            verbose,
        } => diffwarden::cli::git::run_git(
            &workspace,
            &GitOptions {
                staged,
                paths,
                format,
                verbose,
                color: cli.color,
            },
        ),
        Command::Init { force } => match diffwarden::cli::init::run_init(&workspace, force) {
            Ok(InitOutcome::Created) => {
                println!("Created .diffwarden.yaml. Edit the rules to match your project.");
                0
            }
            Ok(InitOutcome::Overwritten) => {
                println!("Overwrote .diffwarden.yaml with the starter policy.");
                0
            }
            Ok(InitOutcome::Skipped) => {
                println!(".diffwarden.yaml already exists; use --force to overwrite it.");
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Command::Validate { path } => {
            let path = path.unwrap_or_else(|| diffwarden::config::policy_file(&workspace));
            diffwarden::cli::validate::run_validate(&path)
        }
        Command::Approve {
            original,
            modified,
            file_name,
        } => diffwarden::cli::approve::run_approve(
            &workspace,
            &ApproveOptions {
                original,
                modified,
                file_name,
            },
        ),
    };

    process::exit(exit_code);
}
