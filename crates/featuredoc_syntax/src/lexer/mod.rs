//! Line lexer for Gherkin feature files.
//!
//! Handles:
//! - Block keywords (`Feature:`, `Background:`, `Scenario:`, `Scenario Outline:`, `Examples:`)
//! - Step keywords (`Given`, `When`, `Then`, `And`, `But`, `*`)
//! - Tag lines, comments, table rows with `\|` / `\\` / `\n` escapes
//! - Doc strings delimited by `"""` or ```` ``` ````
//!
//! ## Module Structure
//!
//! - `tokens` - Line token types (`Line`, `LineKind`)

pub mod tokens;

pub use tokens::{Line, LineKind};

use crate::ast::Span;
use crate::diagnostics::SyntaxError;
use crate::keywords::{self, KeywordId};

const DOCSTRING_FENCES: [&str; 2] = ["\"\"\"", "```"];

/// Lexer state.
///
/// ```text
/// [Normal] --fence--> [DocString(fence, indent)] --same fence--> [Normal]
/// ```
pub struct Lexer<'a> {
    source: &'a str,
    /// Open doc string: fence spelling and column of the opening fence.
    docstring: Option<(&'static str, usize, Span)>,
    block_spellings: Vec<(&'static str, KeywordId)>,
    lines: Vec<Line>,
    errors: Vec<SyntaxError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            docstring: None,
            block_spellings: keywords::block_spellings(),
            lines: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Split the source into classified lines.
    ///
    /// ## Errors
    /// Returns all lexical errors (malformed tags, unterminated table rows, unterminated doc
    /// strings).
    pub fn tokenize(mut self) -> Result<Vec<Line>, Vec<SyntaxError>> {
        let source = self.source;
        let mut offset = 0;
        for (index, raw) in source.split_inclusive('\n').enumerate() {
            let content = raw.trim_end_matches(['\n', '\r']);
            let span = Span::new(offset, offset + content.len());
            self.lex_line(content, span, index + 1);
            offset += raw.len();
        }

        if let Some((fence, _, span)) = self.docstring.take() {
            self.errors.push(
                SyntaxError::new(format!("Unterminated doc string, expected closing {fence}"), span)
                    .with_hint(format!("Close the doc string with a line containing only {fence}")),
            );
        }

        if self.errors.is_empty() {
            Ok(self.lines)
        } else {
            Err(self.errors)
        }
    }

    fn lex_line(&mut self, content: &str, span: Span, number: usize) {
        let trimmed = content.trim();
        // Indentation counts ASCII blanks only, so slicing at it stays on a char boundary.
        let indent = content.len() - content.trim_start_matches([' ', '\t']).len();

        if let Some((fence, fence_indent, _)) = self.docstring {
            if trimmed == fence {
                self.docstring = None;
                self.push(LineKind::DocStringFence, trimmed, span, number);
            } else {
                let strip = indent.min(fence_indent);
                let raw = content[strip..].replace(&format!("\\{fence}"), fence);
                self.push(LineKind::DocStringContent(raw), trimmed, span, number);
            }
            return;
        }

        let kind = if trimmed.is_empty() {
            LineKind::Empty
        } else if trimmed.starts_with('#') {
            LineKind::Comment
        } else if let Some(fence) = DOCSTRING_FENCES.iter().find(|f| trimmed.starts_with(**f)) {
            // Anything after the fence is a media type hint; it is not kept.
            self.docstring = Some((*fence, indent, span));
            LineKind::DocStringFence
        } else if trimmed.starts_with('@') {
            match lex_tags(trimmed) {
                Ok(tags) => LineKind::Tags(tags),
                Err(message) => {
                    self.errors.push(SyntaxError::new(message, span));
                    return;
                }
            }
        } else if trimmed.starts_with('|') {
            match lex_table_row(trimmed) {
                Ok(cells) => LineKind::TableRow(cells),
                Err(message) => {
                    self.errors.push(
                        SyntaxError::new(message, span).with_hint("Every table row must start and end with '|'"),
                    );
                    return;
                }
            }
        } else if let Some(kind) = self.lex_block(trimmed) {
            kind
        } else if let Some(kind) = lex_step(trimmed) {
            kind
        } else {
            LineKind::Text
        };

        self.push(kind, trimmed, span, number);
    }

    fn lex_block(&self, trimmed: &str) -> Option<LineKind> {
        self.block_spellings.iter().find_map(|(spelling, id)| {
            let rest = trimmed.strip_prefix(spelling)?.strip_prefix(':')?;
            Some(LineKind::Block {
                keyword: *id,
                spelling: (*spelling).to_string(),
                name: rest.trim().to_string(),
            })
        })
    }

    fn push(&mut self, kind: LineKind, text: &str, span: Span, number: usize) {
        self.lines.push(Line::new(kind, text, span, number));
    }
}

fn lex_step(trimmed: &str) -> Option<LineKind> {
    keywords::step_spellings().find_map(|(spelling, id)| {
        let rest = trimmed.strip_prefix(spelling)?;
        if !rest.starts_with(' ') && !rest.starts_with('\t') {
            return None;
        }
        Some(LineKind::Step {
            keyword: id,
            spelling: spelling.to_string(),
            text: rest.trim().to_string(),
        })
    })
}

fn lex_tags(trimmed: &str) -> Result<Vec<String>, String> {
    let mut tags = Vec::new();
    for word in trimmed.split_whitespace() {
        if word.starts_with('#') {
            break;
        }
        match word.strip_prefix('@') {
            Some(name) if !name.is_empty() => tags.push(name.to_string()),
            _ => return Err(format!("Expected a tag starting with '@', found '{word}'")),
        }
    }
    Ok(tags)
}

fn lex_table_row(trimmed: &str) -> Result<Vec<String>, String> {
    let inner = trimmed
        .strip_prefix('|')
        .ok_or_else(|| "Table row must start with '|'".to_string())?;

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    let mut closed = false;

    while let Some(c) = chars.next() {
        closed = false;
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('n') => cell.push('\n'),
                Some('\\') => cell.push('\\'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => {
                cells.push(cell.trim().to_string());
                cell.clear();
                closed = true;
            }
            _ => cell.push(c),
        }
    }

    if !closed {
        return Err("Table row must end with '|'".to_string());
    }
    Ok(cells)
}

/// Convenience function to lex a source string.
///
/// This is a shorthand for `Lexer::new(source).tokenize()`.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Line>, Vec<SyntaxError>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LineKind> {
        lex(source).unwrap().into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_block_keywords_prefer_longest_spelling() {
        let lines = kinds("Scenario Outline: a\nScenario: b\nExamples:\n");
        assert!(matches!(&lines[0], LineKind::Block { keyword: KeywordId::ScenarioOutline, name, .. } if name == "a"));
        assert!(matches!(&lines[1], LineKind::Block { keyword: KeywordId::Scenario, name, .. } if name == "b"));
        assert!(matches!(&lines[2], LineKind::Block { keyword: KeywordId::Examples, name, .. } if name.is_empty()));
    }

    #[test]
    fn test_step_requires_space_after_keyword() {
        let lines = kinds("Given a user\nGivens are text\n* star step\n");
        assert!(matches!(&lines[0], LineKind::Step { keyword: KeywordId::Given, text, .. } if text == "a user"));
        assert_eq!(lines[1], LineKind::Text);
        assert!(matches!(&lines[2], LineKind::Step { keyword: KeywordId::Star, .. }));
    }

    #[test]
    fn test_tags_stop_at_comment() {
        let lines = kinds("@smoke @us-12 # trailing\n");
        assert_eq!(lines[0], LineKind::Tags(vec!["smoke".to_string(), "us-12".to_string()]));
    }

    #[test]
    fn test_bad_tag_is_an_error() {
        let errs = lex("@ok notatag\n").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("notatag"));
    }

    #[test]
    fn test_table_row_escapes() {
        let lines = kinds(r"| a \| b | c\nd | \\ |");
        assert_eq!(
            lines[0],
            LineKind::TableRow(vec!["a | b".to_string(), "c\nd".to_string(), "\\".to_string()])
        );
    }

    #[test]
    fn test_unterminated_table_row() {
        let errs = lex("| a | b\n").unwrap_err();
        assert!(errs[0].message.contains("must end with '|'"));
    }

    #[test]
    fn test_docstring_keeps_relative_indentation() {
        let source = "    \"\"\"\n    line one\n      indented\n    \"\"\"\n";
        let lines = kinds(source);
        assert_eq!(lines[0], LineKind::DocStringFence);
        assert_eq!(lines[1], LineKind::DocStringContent("line one".to_string()));
        assert_eq!(lines[2], LineKind::DocStringContent("  indented".to_string()));
        assert_eq!(lines[3], LineKind::DocStringFence);
    }

    #[test]
    fn test_docstring_keeps_unicode_indentation() {
        let source = " \"\"\"\n\u{3000}x\n  \u{a0}y\n \"\"\"\n";
        let lines = kinds(source);
        assert_eq!(lines[1], LineKind::DocStringContent("\u{3000}x".to_string()));
        assert_eq!(lines[2], LineKind::DocStringContent(" \u{a0}y".to_string()));
        assert_eq!(lines[3], LineKind::DocStringFence);
    }

    #[test]
    fn test_keywords_inside_docstring_are_content() {
        let lines = kinds("```\nGiven not a step\n```\n");
        assert_eq!(lines[1], LineKind::DocStringContent("Given not a step".to_string()));
    }

    #[test]
    fn test_unterminated_docstring() {
        let errs = lex("\"\"\"\ntext\n").unwrap_err();
        assert!(errs[0].message.contains("Unterminated doc string"));
    }

    #[test]
    fn test_spans_and_line_numbers() {
        let lines = lex("Feature: a\r\n\r\n  Scenario: b\n").unwrap();
        assert_eq!(lines[0].span, Span::new(0, 10));
        assert_eq!(lines[2].number, 3);
        assert_eq!(lines[2].text, "Scenario: b");
        assert_eq!(lines[2].span.start, 14);
    }
}
