//! AST for Gherkin feature files.
//!
//! The tree mirrors what the document assembler needs: names, tags, free-text description lines,
//! steps with their tables, and example tables for outlines. Comments are dropped.

/// Byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed `.feature` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub keyword: String,
    pub name: String,
    /// Tag names without the leading `@`, in source order.
    pub tags: Vec<String>,
    pub description: Vec<String>,
    pub background: Option<Background>,
    pub scenarios: Vec<Scenario>,
    pub span: Span,
}

/// Steps shared by every scenario of a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub keyword: String,
    pub name: String,
    pub steps: Vec<Step>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    Scenario,
    Outline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub keyword: String,
    pub kind: ScenarioKind,
    pub name: String,
    pub tags: Vec<String>,
    pub description: Vec<String>,
    pub steps: Vec<Step>,
    /// Always empty unless `kind == ScenarioKind::Outline`.
    pub examples: Vec<Examples>,
    pub span: Span,
}

impl Scenario {
    pub fn is_outline(&self) -> bool {
        self.kind == ScenarioKind::Outline
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Keyword as written (`Given`, `And`, `*`, ...), without trailing whitespace.
    pub keyword: String,
    pub text: String,
    pub table: Option<DataTable>,
    pub docstring: Option<String>,
    pub span: Span,
}

/// An `Examples:` block attached to a scenario outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Examples {
    pub keyword: String,
    pub name: String,
    pub tags: Vec<String>,
    pub table: Option<DataTable>,
    pub span: Span,
}

/// A pipe-delimited table. The first source row is the heading row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataTable {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
