//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use featuredoc_syntax::{ParseFileError, parse_feature};

use crate::assembler::{AssemblyError, assemble, discover_features};
use crate::config::GenerateConfig;

use super::{CliError, CliResult, ExitCode};

/// Maximum feature file size (10 MB)
///
/// Larger files are rejected by the debug commands before being read.
const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (10 MB)
pub fn read_source(file_path: &Path) -> CliResult<String> {
    let metadata = fs::metadata(file_path)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Feature file '{}' is too large ({} bytes, max {} bytes)",
            file_path.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path.display(), e)))
}

/// Generate the document.
pub fn generate(config: &GenerateConfig) -> CliResult<ExitCode> {
    let outcome = assemble(config).map_err(|e| match e {
        AssemblyError::Config(e) => CliError::new(format!("Invalid configuration: {e}"), ExitCode::CONFIG),
        other => CliError::failure(format!("Error generating document: {other}")),
    })?;

    println!(
        "✓ {} written: {} feature(s), {} scenario(s)",
        outcome.output.display(),
        outcome.features,
        outcome.scenarios
    );
    if let Some(totals) = outcome.totals {
        println!(
            "  execution: {} scenario(s), {} passed, {} failed, {} skipped",
            totals.total, totals.succeeded, totals.failed, totals.skipped
        );
    }
    for path in &outcome.skipped {
        println!("  skipped: {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse a feature file and dump the tree (debug).
pub fn parse_file(file_path: &Path) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    match parse_feature(&source) {
        Ok(feature) => {
            println!("{:#?}", feature);
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            let error = ParseFileError::Syntax {
                path: file_path.to_path_buf(),
                source_text: source,
                errors,
            };
            Err(CliError::failure(render_diagnostics(&error)))
        }
    }
}

/// Parse every feature file under `path` and print the syntax errors.
pub fn check(path: &Path) -> CliResult<ExitCode> {
    let files = collect_feature_files(path);
    if files.is_empty() {
        return Err(CliError::failure(format!("No .feature files found in {}", path.display())));
    }

    let mut failed = 0;
    for file in &files {
        match featuredoc_syntax::parse_file(file) {
            Ok(_) => tracing::debug!(path = %file.display(), "ok"),
            Err(e) => {
                eprintln!("{}", render_diagnostics(&e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::failure(format!(
            "\n{} of {} file(s) have errors",
            failed,
            files.len()
        )));
    }
    println!("✓ {} file(s) parsed", files.len());
    Ok(ExitCode::SUCCESS)
}

/// `miette` rendering of every syntax error, or the plain message for I/O failures.
fn render_diagnostics(error: &ParseFileError) -> String {
    let diagnostics = error.diagnostics();
    if diagnostics.is_empty() {
        return error.to_string();
    }
    let mut msg = String::new();
    for diagnostic in diagnostics {
        msg.push_str(&format!("{:?}\n", miette::Report::new(diagnostic)));
    }
    msg.trim_end().to_string()
}

fn collect_feature_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "feature") {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        }
    } else {
        discover_features(path)
    }
}
