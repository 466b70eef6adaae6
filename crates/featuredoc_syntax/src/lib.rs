//! Gherkin syntax frontend for featuredoc: keyword registry, line lexer, parser, AST, diagnostics.
//!
//! This crate only understands the shape of `.feature` files. It does not know anything about
//! documents, reports or diagrams; the assembler in the `featuredoc` crate consumes the AST.
//!
//! ## Notes
//! - Only English keywords are recognized (`# language:` headers are accepted and ignored).
//! - `Rule:` blocks are rejected with a diagnostic instead of being silently flattened.
//!
//! ## Examples
//! ```rust
//! use featuredoc_syntax::parse_feature;
//!
//! let feature = parse_feature("Feature: Login\n  Scenario: ok\n    Given a user\n").unwrap();
//! assert_eq!(feature.name, "Login");
//! assert_eq!(feature.scenarios.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod keywords;
pub mod lexer;
pub mod outline;
pub mod parser;

use std::fs;
use std::path::Path;

pub use ast::{Background, DataTable, Examples, Feature, Scenario, ScenarioKind, Span, Step};
pub use diagnostics::{ParseFileError, SyntaxError};
pub use outline::{OutlineName, OutlineNameError};

/// Lex and parse the source text of a single `.feature` file.
///
/// ## Errors
/// Returns every syntax error found; the parser recovers at line granularity.
pub fn parse_feature(source: &str) -> Result<Feature, Vec<SyntaxError>> {
    let lines = lexer::lex(source)?;
    parser::parse(&lines)
}

/// Read and parse a `.feature` file from disk.
///
/// ## Errors
/// - [`ParseFileError::Io`] when the file cannot be read.
/// - [`ParseFileError::Syntax`] when the content is not valid Gherkin; the error keeps the source
///   so it can be rendered with [`ParseFileError::diagnostics`].
pub fn parse_file(path: &Path) -> Result<Feature, ParseFileError> {
    let source = fs::read_to_string(path).map_err(|source| ParseFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature(&source).map_err(|errors| ParseFileError::Syntax {
        path: path.to_path_buf(),
        source_text: source,
        errors,
    })
}
