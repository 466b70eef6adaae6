//! Line token types for the Gherkin lexer.
//!
//! Gherkin is line oriented, so the lexer produces one [`Line`] per source line instead of a
//! stream of word tokens. Keyword-bearing lines carry stable ids from [`crate::keywords`].

use crate::ast::Span;
use crate::keywords::KeywordId;

/// Classification of a single source line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Empty,
    /// `# ...`, including `# language:` headers.
    Comment,
    /// `@a @b` (names stored without the `@`).
    Tags(Vec<String>),
    /// `Feature: name`, `Scenario Outline: name`, ...
    Block {
        keyword: KeywordId,
        spelling: String,
        name: String,
    },
    /// `Given something`
    Step {
        keyword: KeywordId,
        spelling: String,
        text: String,
    },
    /// `| a | b |`
    TableRow(Vec<String>),
    /// Opening or closing `"""` / ```` ``` ```` fence.
    DocStringFence,
    /// Raw line inside a doc string, indentation relative to the fence removed.
    DocStringContent(String),
    /// Anything else: description text.
    Text,
}

/// A lexed source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    /// Line content with surrounding whitespace removed.
    pub text: String,
    pub span: Span,
    /// 1-based line number.
    pub number: usize,
}

impl Line {
    pub fn new(kind: LineKind, text: impl Into<String>, span: Span, number: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            number,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Empty | LineKind::Comment)
    }
}
