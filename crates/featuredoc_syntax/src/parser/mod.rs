//! Parser for Gherkin feature files.
//!
//! Converts the line stream of [`crate::lexer`] into a [`Feature`]. The grammar accepted here is
//! the subset used by living-documentation repositories:
//!
//! ```text
//! feature     := tags? "Feature:" description background? scenario*
//! background  := "Background:" description steps
//! scenario    := tags? ("Scenario:" | "Scenario Outline:") description steps examples*
//! examples    := tags? "Examples:" description table
//! steps       := (step (table | docstring)?)*
//! ```

use crate::ast::{Background, DataTable, Examples, Feature, Scenario, ScenarioKind, Span, Step};
use crate::diagnostics::SyntaxError;
use crate::keywords::KeywordId;
use crate::lexer::{Line, LineKind};

/// Parser state.
///
/// ## Notes
/// - Errors inside a scenario are recorded and the parser resynchronizes at the next scenario
///   boundary, so one pass reports every broken scenario of a file.
pub struct Parser<'a> {
    lines: &'a [Line],
    pos: usize,
    errors: Vec<SyntaxError>,
}

type ParseResult<T> = Result<T, SyntaxError>;

impl<'a> Parser<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        Self {
            lines,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the whole line stream into a [`Feature`].
    ///
    /// ## Errors
    /// Returns every syntax error found.
    pub fn parse(mut self) -> Result<Feature, Vec<SyntaxError>> {
        match self.feature() {
            Ok(feature) if self.errors.is_empty() => Ok(feature),
            Ok(_) => Err(self.errors),
            Err(e) => {
                self.errors.push(e);
                Err(self.errors)
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Line> {
        let line = self.lines.get(self.pos);
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    fn skip_blank(&mut self) {
        while self.peek().is_some_and(Line::is_blank) {
            self.pos += 1;
        }
    }

    fn end_span(&self) -> Span {
        self.lines.last().map(|l| Span::new(l.span.end, l.span.end)).unwrap_or_default()
    }

    /// Free-text lines following a block header, with leading and trailing blank lines removed.
    ///
    /// A feature description is free-form Markdown: step-like lines (`And so on`), table rows and
    /// code fences there are kept as text, so the markup renderer still sees the table or fence.
    fn description(&mut self, free_form: bool) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.peek() {
            match &line.kind {
                LineKind::Text | LineKind::Empty => lines.push(line.text.clone()),
                LineKind::Step { .. } | LineKind::TableRow(_) | LineKind::DocStringFence if free_form => {
                    lines.push(line.text.clone())
                }
                LineKind::DocStringContent(raw) if free_form => lines.push(raw.clone()),
                LineKind::Comment => {}
                _ => break,
            }
            self.pos += 1;
        }
        while lines.last().is_some_and(|l: &String| l.is_empty()) {
            lines.pop();
        }
        let leading = lines.iter().take_while(|l| l.is_empty()).count();
        lines.drain(..leading);
        lines
    }

    /// Whether the tag lines at the cursor decorate an `Examples:` block.
    fn tags_lead_to_examples(&self) -> bool {
        self.lines[self.pos..]
            .iter()
            .find(|l| !l.is_blank() && !matches!(l.kind, LineKind::Tags(_)))
            .is_some_and(|l| matches!(l.kind, LineKind::Block { keyword: KeywordId::Examples, .. }))
    }

    /// Skip to the next line that can start a feature child.
    fn synchronize(&mut self) {
        while let Some(line) = self.peek() {
            match &line.kind {
                LineKind::Tags(_) => return,
                LineKind::Block { keyword, .. }
                    if matches!(
                        keyword,
                        KeywordId::Scenario | KeywordId::ScenarioOutline | KeywordId::Background
                    ) =>
                {
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    fn feature(&mut self) -> ParseResult<Feature> {
        let mut tags = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.advance() else {
                return Err(SyntaxError::new("Expected 'Feature:' but the file is empty", self.end_span()));
            };
            match &line.kind {
                LineKind::Tags(t) => tags.extend(t.iter().cloned()),
                LineKind::Block {
                    keyword: KeywordId::Feature,
                    spelling,
                    name,
                } => {
                    let mut feature = Feature {
                        keyword: spelling.clone(),
                        name: name.clone(),
                        tags,
                        description: self.description(true),
                        background: None,
                        scenarios: Vec::new(),
                        span: line.span,
                    };
                    self.feature_children(&mut feature);
                    return Ok(feature);
                }
                _ => {
                    return Err(SyntaxError::new(
                        format!("Expected 'Feature:', found '{}'", line.text),
                        line.span,
                    ));
                }
            }
        }
    }

    fn feature_children(&mut self, feature: &mut Feature) {
        let mut pending_tags: Vec<String> = Vec::new();

        while let Some(line) = self.peek() {
            let result = match &line.kind {
                LineKind::Empty | LineKind::Comment => {
                    self.pos += 1;
                    Ok(())
                }
                LineKind::Tags(t) => {
                    pending_tags.extend(t.iter().cloned());
                    self.pos += 1;
                    Ok(())
                }
                LineKind::Block {
                    keyword: KeywordId::Background,
                    ..
                } => {
                    if feature.background.is_some() || !feature.scenarios.is_empty() {
                        self.pos += 1;
                        Err(SyntaxError::new("Background must come once, before any scenario", line.span))
                    } else {
                        self.background().map(|b| feature.background = Some(b))
                    }
                }
                LineKind::Block {
                    keyword: KeywordId::Scenario | KeywordId::ScenarioOutline,
                    ..
                } => {
                    let tags = std::mem::take(&mut pending_tags);
                    self.scenario(tags).map(|s| feature.scenarios.push(s))
                }
                LineKind::Block {
                    keyword: KeywordId::Rule,
                    ..
                } => {
                    self.pos += 1;
                    Err(SyntaxError::new("'Rule:' blocks are not supported", line.span)
                        .with_hint("Move the rule's scenarios directly under the feature"))
                }
                LineKind::Block {
                    keyword: KeywordId::Feature,
                    ..
                } => {
                    self.pos += 1;
                    Err(SyntaxError::new("Only one 'Feature:' is allowed per file", line.span))
                }
                _ => {
                    self.pos += 1;
                    Err(SyntaxError::new(
                        format!("Unexpected '{}' outside of a scenario", line.text),
                        line.span,
                    ))
                }
            };

            if let Err(e) = result {
                self.errors.push(e);
                pending_tags.clear();
                self.synchronize();
            }
        }

        if !pending_tags.is_empty() {
            self.errors.push(SyntaxError::new(
                format!("Tags {pending_tags:?} are not followed by a scenario"),
                self.end_span(),
            ));
        }
    }

    fn background(&mut self) -> ParseResult<Background> {
        let Some(header) = self.advance() else {
            return Err(SyntaxError::new("Expected 'Background:'", self.end_span()));
        };
        let LineKind::Block { spelling, name, .. } = &header.kind else {
            return Err(SyntaxError::new("Expected 'Background:'", header.span));
        };
        let _ = self.description(false);
        let steps = self.steps()?;
        Ok(Background {
            keyword: spelling.clone(),
            name: name.clone(),
            span: header.span,
            steps,
        })
    }

    fn scenario(&mut self, tags: Vec<String>) -> ParseResult<Scenario> {
        let Some(header) = self.advance() else {
            return Err(SyntaxError::new("Expected 'Scenario:'", self.end_span()));
        };
        let LineKind::Block {
            keyword,
            spelling,
            name,
        } = &header.kind
        else {
            return Err(SyntaxError::new("Expected 'Scenario:'", header.span));
        };
        let kind = if *keyword == KeywordId::ScenarioOutline {
            ScenarioKind::Outline
        } else {
            ScenarioKind::Scenario
        };

        let description = self.description(false);
        let steps = self.steps()?;

        let mut examples = Vec::new();
        let mut example_tags = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.peek() else { break };
            match &line.kind {
                LineKind::Tags(t) if self.tags_lead_to_examples() => {
                    example_tags.extend(t.iter().cloned());
                    self.pos += 1;
                }
                LineKind::Block {
                    keyword: KeywordId::Examples,
                    ..
                } => {
                    if kind != ScenarioKind::Outline {
                        return Err(SyntaxError::new(
                            format!("'{}' is only allowed in a Scenario Outline", line.text),
                            line.span,
                        )
                        .with_hint(format!("Use 'Scenario Outline: {name}' to run '{name}' over examples")));
                    }
                    examples.push(self.examples(std::mem::take(&mut example_tags))?);
                }
                _ => break,
            }
        }

        Ok(Scenario {
            keyword: spelling.clone(),
            kind,
            name: name.clone(),
            tags,
            description,
            steps,
            examples,
            span: header.span,
        })
    }

    fn examples(&mut self, tags: Vec<String>) -> ParseResult<Examples> {
        let Some(header) = self.advance() else {
            return Err(SyntaxError::new("Expected 'Examples:'", self.end_span()));
        };
        let LineKind::Block { spelling, name, .. } = &header.kind else {
            return Err(SyntaxError::new("Expected 'Examples:'", header.span));
        };
        let _ = self.description(false);
        let table = self.table()?;
        Ok(Examples {
            keyword: spelling.clone(),
            name: name.clone(),
            tags,
            table,
            span: header.span,
        })
    }

    fn steps(&mut self) -> ParseResult<Vec<Step>> {
        let mut steps: Vec<Step> = Vec::new();
        loop {
            self.skip_blank();
            let Some(line) = self.peek() else { break };
            match &line.kind {
                LineKind::Step { spelling, text, .. } => {
                    self.pos += 1;
                    let mut step = Step {
                        keyword: spelling.clone(),
                        text: text.clone(),
                        table: None,
                        docstring: None,
                        span: line.span,
                    };
                    self.skip_blank();
                    match self.peek().map(|l| &l.kind) {
                        Some(LineKind::TableRow(_)) => step.table = self.table()?,
                        Some(LineKind::DocStringFence) => step.docstring = Some(self.docstring()),
                        _ => {}
                    }
                    steps.push(step);
                }
                LineKind::TableRow(_) => {
                    return Err(SyntaxError::new("Table rows must follow a step or 'Examples:'", line.span));
                }
                LineKind::Text | LineKind::DocStringFence | LineKind::DocStringContent(_) => {
                    return Err(SyntaxError::new(
                        format!("Expected a step (Given/When/Then/And/But), found '{}'", line.text),
                        line.span,
                    ));
                }
                _ => break,
            }
        }
        Ok(steps)
    }

    fn docstring(&mut self) -> String {
        // Opening fence.
        self.pos += 1;
        let mut content = Vec::new();
        while let Some(line) = self.advance() {
            match &line.kind {
                LineKind::DocStringContent(raw) => content.push(raw.as_str()),
                // The lexer guarantees the closing fence exists.
                _ => break,
            }
        }
        content.join("\n")
    }

    fn table(&mut self) -> ParseResult<Option<DataTable>> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut width = 0;
        while let Some(line) = self.peek() {
            match &line.kind {
                LineKind::TableRow(cells) => {
                    if rows.is_empty() {
                        width = cells.len();
                    } else if cells.len() != width {
                        return Err(SyntaxError::new(
                            format!("Inconsistent cell count: expected {width}, found {}", cells.len()),
                            line.span,
                        ));
                    }
                    rows.push(cells.clone());
                    self.pos += 1;
                }
                LineKind::Comment => self.pos += 1,
                _ => break,
            }
        }

        let mut rows = rows.into_iter();
        Ok(rows.next().map(|headings| DataTable {
            headings,
            rows: rows.collect(),
        }))
    }
}

/// Parse a lexed line stream into a [`Feature`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Errors
/// Returns `Err(Vec<SyntaxError>)` if parsing fails.
#[tracing::instrument(skip_all, fields(line_count = lines.len()))]
pub fn parse(lines: &[Line]) -> Result<Feature, Vec<SyntaxError>> {
    Parser::new(lines).parse()
}

#[cfg(test)]
mod tests;
