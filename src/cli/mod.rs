//! CLI module for featuredoc
//!
//! ## Commands
//!
//! - `generate` - Write the living documentation of a feature repository
//! - `check <path>` - Parse feature files and report syntax errors
//!
//! Debug flags: `--parse <file>` dumps the parsed feature, `--license` prints the license notice.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_OUTPUT, GenerateConfig};
use crate::version::FEATUREDOC_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Invalid configuration (missing repository, empty title, ...).
    pub const CONFIG: ExitCode = ExitCode(2);
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

/// License notice - embedded at compile time from assets/license.txt
const LICENSE: &str = include_str!("../../assets/license.txt");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Living documentation generator for Gherkin feature files
#[derive(Parser, Debug)]
#[command(name = "featuredoc")]
#[command(version = FEATUREDOC_VERSION)]
#[command(about = "Turn a tree of .feature files into a Word document", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Parse a feature file and dump it (debug)
    #[arg(long = "parse", value_name = "FILE")]
    pub parse_file: Option<PathBuf>,

    /// Print the license notice
    #[arg(long)]
    pub license: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the document
    Generate(GenerateArgs),

    /// Parse feature files and report syntax errors
    Check {
        /// Feature file or directory
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Root folder of the .feature files
    #[arg(short, long, value_name = "DIR")]
    pub repository: PathBuf,

    /// Document title
    #[arg(short, long)]
    pub title: String,

    /// Tags containing this text are shown as the related user story
    #[arg(long = "tag", value_name = "PREFIX")]
    pub tag_prefix: Option<String>,

    /// Plain execution report to summarize
    #[arg(short, long = "execution", value_name = "FILE")]
    pub execution: Option<PathBuf>,

    /// Folder of Markdown forewords
    #[arg(short, long, value_name = "DIR")]
    pub forewords: Option<PathBuf>,

    /// Output file name (.docx is appended when missing)
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// PlantUML jar (default: $FEATUREDOC_PLANTUML_JAR, then assets/plantuml.jar)
    #[arg(long, value_name = "FILE")]
    pub plantuml_jar: Option<PathBuf>,

    /// Timeout for one diagram rendering, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub diagram_timeout: u64,
}

impl GenerateArgs {
    pub fn to_config(&self) -> GenerateConfig {
        let mut config = GenerateConfig::new(&self.repository, &self.title)
            .with_output(&self.output)
            .with_diagram_timeout(Duration::from_secs(self.diagram_timeout));
        if let Some(prefix) = &self.tag_prefix {
            config = config.with_tag_prefix(prefix);
        }
        if let Some(report) = &self.execution {
            config = config.with_report(report);
        }
        if let Some(folder) = &self.forewords {
            config = config.with_forewords(folder);
        }
        if let Some(jar) = &self.plantuml_jar {
            config = config.with_plantuml_jar(jar);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
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
    // Handle debug flags first
    if cli.license {
        println!("{LICENSE}");
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file);
    }

    match cli.command {
        Some(Command::Generate(args)) => commands::generate(&args.to_config()),
        Some(Command::Check { path }) => commands::check(&path),
        // No command - show help
        None => Err(CliError::failure("No command given, see `featuredoc --help`")),
    }
}

// ============================================================================
// Tests
// ============================================================================
