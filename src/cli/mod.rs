//! Command-line interface for the generator.
//!
//! ## Commands
//!
//! - `generate` - Generate a crate from a model and write it to disk
//! - `check` - Run the whole pipeline without writing anything
//! - `protocols` - List the implemented protocols in selection order
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generate Rust client crates from Smithy JSON AST models
#[derive(Parser, Debug)]
#[command(name = "shapegen")]
#[command(version = VERSION)]
#[command(about = "Generate Rust client crates from Smithy JSON AST models", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a crate and write it to disk
    Generate {
        /// Model in Smithy JSON AST form
        #[arg(long, value_name = "FILE")]
        model: PathBuf,
        /// Run configuration (shapegen.toml)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
        /// Directory the crate is written to
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        /// Run rustfmt over the written sources
        #[arg(long)]
        rustfmt: bool,
    },

    /// Run generation without writing files
    Check {
        /// Model in Smithy JSON AST form
        #[arg(long, value_name = "FILE")]
        model: PathBuf,
        /// Run configuration (shapegen.toml)
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
    },

    /// List implemented protocols in selection order
    Protocols,
}

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate {
            model,
            config,
            out,
            rustfmt,
        } => commands::generate(&model, &config, &out, rustfmt),
        Command::Check { model, config } => commands::check(&model, &config),
        Command::Protocols => commands::protocols(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::try_parse_from([
            "shapegen",
            "generate",
            "--model",
            "weather.json",
            "--config",
            "shapegen.toml",
            "--out",
            "out",
            "--rustfmt",
        ])
        .unwrap();
        if let Command::Generate { out, rustfmt, .. } = cli.command {
            assert_eq!(out, PathBuf::from("out"));
            assert!(rustfmt);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["shapegen", "check", "--model", "m.json", "--config", "c.toml"]).unwrap();
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_cli_generate_requires_out() {
        let result = Cli::try_parse_from(["shapegen", "generate", "--model", "m.json", "--config", "c.toml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_protocols() {
        let cli = Cli::try_parse_from(["shapegen", "protocols"]).unwrap();
        assert!(matches!(cli.command, Command::Protocols));
    }
}
