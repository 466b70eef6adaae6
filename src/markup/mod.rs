//! Markdown to document blocks
//!
//! Renders the restricted Markdown dialect used in feature descriptions and forewords: headings,
//! paragraphs with bold/italic/code spans, bullet and numbered lists, GFM tables, images, fenced
//! code and `<br>` line breaks. Other HTML is dropped.

use std::path::Path;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::diagram::fit_within;
use crate::document::{Document, MAX_HEADING_LEVEL, ParagraphStyle, Run};

/// Render `text` and append the resulting blocks to `document`.
pub fn insert_markup(document: &mut Document, text: &str) {
    let mut writer = MarkupWriter::new(document);
    for event in Parser::new_ext(text, Options::ENABLE_TABLES) {
        writer.event(event);
    }
    writer.flush();
}

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: Option<String>,
}

/// Event sink tracking the inline attributes and the enclosing block.
struct MarkupWriter<'d> {
    document: &'d mut Document,
    runs: Vec<Run>,
    bold: usize,
    italic: usize,
    heading: Option<usize>,
    /// One entry per open list: `Some(next number)` for ordered lists.
    lists: Vec<Option<u64>>,
    code: Option<String>,
    image: Option<(String, String)>,
    table: Option<TableState>,
}

impl<'d> MarkupWriter<'d> {
    fn new(document: &'d mut Document) -> Self {
        Self {
            document,
            runs: Vec::new(),
            bold: 0,
            italic: 0,
            heading: None,
            lists: Vec::new(),
            code: None,
            image: None,
            table: None,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text, false),
            Event::Code(text) => self.text(&text, true),
            Event::SoftBreak => {
                if !self.runs.last().is_some_and(|r| r.line_break) {
                    self.text(" ", false);
                }
            }
            Event::HardBreak => self.line_break(),
            Event::Html(html) | Event::InlineHtml(html) => {
                if is_line_break(&html) {
                    self.line_break();
                }
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(level as usize);
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "\u{2022} ".to_string(),
                };
                self.runs.push(Run::text(marker));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                if let CodeBlockKind::Fenced(lang) = &kind {
                    tracing::trace!(lang = %lang, "code block");
                }
                self.code = Some(String::new());
            }
            Tag::Table(_) => {
                self.flush();
                self.table = Some(TableState::default());
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(String::new());
                }
            }
            Tag::Strong => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::Image { dest_url, .. } => self.image = Some((dest_url.to_string(), String::new())),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let text: String = self.runs.drain(..).map(|r| r.text).collect();
                let level = self.heading.take().unwrap_or(1).clamp(1, MAX_HEADING_LEVEL);
                self.document.add_heading(text.trim(), level);
            }
            TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let mut runs = Vec::new();
                    for (index, line) in code.trim_end_matches('\n').lines().enumerate() {
                        if index > 0 {
                            runs.push(Run::line_break());
                        }
                        runs.push(Run::text(line).monospace());
                    }
                    self.document.add_paragraph(runs, ParagraphStyle::Code);
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    if let Some(cell) = table.cell.take() {
                        table.row.push(cell.trim().to_string());
                    }
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.document.add_table(table.rows);
                }
            }
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Image => {
                if let Some((dest, alt)) = self.image.take() {
                    self.picture(&dest, &alt);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str, code: bool) {
        if let Some(buffer) = self.code.as_mut() {
            buffer.push_str(text);
        } else if let Some((_, alt)) = self.image.as_mut() {
            alt.push_str(text);
        } else if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.push_str(text);
        } else {
            let mut run = Run::text(text);
            run.bold = self.bold > 0;
            run.italic = self.italic > 0;
            run.monospace = code;
            self.runs.push(run);
        }
    }

    fn line_break(&mut self) {
        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.push('\n');
        } else if self.code.is_none() && self.image.is_none() {
            self.runs.push(Run::line_break());
        }
    }

    fn picture(&mut self, dest: &str, alt: &str) {
        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.push_str(alt);
            return;
        }

        let path = Path::new(dest);
        let embedded = !is_remote(dest)
            && path.is_file()
            && match image::image_dimensions(path) {
                Ok((w, h)) => {
                    self.flush();
                    match self.document.add_picture(path, Some(fit_within(w, h))) {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(error = %e, "picture not embedded");
                            false
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable picture");
                    false
                }
            };

        if !embedded {
            tracing::debug!(dest, "picture rendered as its alt text");
            self.runs.push(Run::text(alt).italic());
        }
    }

    /// Emit the pending runs as a paragraph styled after the enclosing list, if any.
    fn flush(&mut self) {
        if self.heading.is_some() || self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        if runs.iter().all(|r| !r.line_break && r.text.trim().is_empty()) {
            return;
        }
        let style = match self.lists.last() {
            Some(Some(_)) => ParagraphStyle::ListNumber,
            Some(None) => ParagraphStyle::ListBullet,
            None => ParagraphStyle::Normal,
        };
        self.document.add_paragraph(runs, style);
    }
}

fn is_line_break(html: &str) -> bool {
    let tag: String = html.trim().to_ascii_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    matches!(tag.as_str(), "<br>" | "<br/>")
}

fn is_remote(dest: &str) -> bool {
    dest.starts_with("http://") || dest.starts_with("https://")
}
