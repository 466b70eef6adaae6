//! Syntax errors and their rendering.
//!
//! [`SyntaxError`] is the plain, comparable error produced by the lexer and parser. Rendering with
//! source context goes through [`SyntaxDiagnostic`], a `miette` diagnostic built on demand.

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// A syntax error with location information.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub hints: Vec<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// 1-based line number of the error start.
    pub fn line(&self, source: &str) -> usize {
        let offset = self.span.start.min(source.len());
        source[..offset].matches('\n').count() + 1
    }
}

/// A [`SyntaxError`] attached to its source text, ready for `miette` rendering.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(featuredoc::syntax))]
pub struct SyntaxDiagnostic {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl SyntaxDiagnostic {
    pub fn new(file_name: &str, source: &str, error: &SyntaxError) -> Self {
        let start = error.span.start.min(source.len());
        let len = error.span.len().min(source.len() - start);
        Self {
            message: error.message.clone(),
            source_code: NamedSource::new(file_name, source.to_string()),
            span: (start, len).into(),
            help: if error.hints.is_empty() {
                None
            } else {
                Some(error.hints.join("\n"))
            },
        }
    }
}

/// Failure to turn a `.feature` file into a [`crate::Feature`].
#[derive(Debug, Error)]
pub enum ParseFileError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has {} syntax error(s), first: {}", .path.display(), .errors.len(), first_message(.errors))]
    Syntax {
        path: PathBuf,
        source_text: String,
        errors: Vec<SyntaxError>,
    },
}

fn first_message(errors: &[SyntaxError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("unknown")
}

impl ParseFileError {
    /// Build one `miette` diagnostic per syntax error. I/O failures yield nothing.
    pub fn diagnostics(&self) -> Vec<SyntaxDiagnostic> {
        match self {
            ParseFileError::Io { .. } => Vec::new(),
            ParseFileError::Syntax {
                path,
                source_text,
                errors,
            } => {
                let name = path.display().to_string();
                errors
                    .iter()
                    .map(|e| SyntaxDiagnostic::new(&name, source_text, e))
                    .collect()
            }
        }
    }
}
