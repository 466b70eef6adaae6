//! In-memory output document
//!
//! An append-only list of blocks (headings, styled paragraphs, tables, pictures, page breaks)
//! built strictly in traversal order and persisted once with [`Document::save`].
//!
//! ## Modules
//!
//! - `docx` - Conversion of the block list to a `.docx` package

mod docx;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Heading level 0 is the document title; 1..=9 map to `Heading1`..`Heading9`.
pub const MAX_HEADING_LEVEL: usize = 9;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read picture {}: {source}", .path.display())]
    PictureIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported picture {}: {source}", .path.display())]
    PictureFormat {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot package {}: {message}", .path.display())]
    Package { path: PathBuf, message: String },
}

/// Paragraph styles known to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphStyle {
    #[default]
    Normal,
    NoSpacing,
    ListBullet,
    ListNumber,
    /// Monospace block (doc strings, fenced code).
    Code,
}

impl ParagraphStyle {
    pub fn style_id(self) -> &'static str {
        match self {
            ParagraphStyle::Normal => "Normal",
            ParagraphStyle::NoSpacing => "NoSpacing",
            ParagraphStyle::ListBullet => "ListBullet",
            ParagraphStyle::ListNumber => "ListNumber",
            ParagraphStyle::Code => "Code",
        }
    }
}

/// A run of text sharing one set of character attributes, or a hard line break.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub monospace: bool,
    pub line_break: bool,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn line_break() -> Self {
        Self {
            line_break: true,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn monospace(mut self) -> Self {
        self.monospace = true;
        self
    }
}

/// An embedded raster picture. The bytes are read when the picture is added so the document does
/// not depend on scratch files outliving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub source: PathBuf,
    pub bytes: Vec<u8>,
    /// Display size in pixels.
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { text: String, level: usize },
    Paragraph { runs: Vec<Run>, style: ParagraphStyle },
    /// First row is the header row.
    Table { rows: Vec<Vec<String>> },
    Picture(Picture),
    PageBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Add a heading; levels above [`MAX_HEADING_LEVEL`] are clamped.
    pub fn add_heading(&mut self, text: impl Into<String>, level: usize) {
        self.blocks.push(Block::Heading {
            text: text.into(),
            level: level.min(MAX_HEADING_LEVEL),
        });
    }

    pub fn add_paragraph(&mut self, runs: Vec<Run>, style: ParagraphStyle) {
        self.blocks.push(Block::Paragraph { runs, style });
    }

    /// Add a single-run paragraph.
    pub fn add_text(&mut self, text: impl Into<String>, style: ParagraphStyle) {
        self.add_paragraph(vec![Run::text(text)], style);
    }

    /// Add a table. Short rows are padded to the widest row.
    pub fn add_table(&mut self, mut rows: Vec<Vec<String>>) {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return;
        }
        for row in &mut rows {
            row.resize(width, String::new());
        }
        self.blocks.push(Block::Table { rows });
    }

    /// Embed the picture at `path`, displayed at `size` or at its natural size.
    ///
    /// ## Errors
    /// Fails when the file cannot be read or is not a supported raster image.
    pub fn add_picture(&mut self, path: &Path, size: Option<(u32, u32)>) -> Result<(), DocumentError> {
        let bytes = fs::read(path).map_err(|source| DocumentError::PictureIo {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = match size {
            Some(size) => size,
            None => image::image_dimensions(path).map_err(|source| DocumentError::PictureFormat {
                path: path.to_path_buf(),
                source,
            })?,
        };
        self.blocks.push(Block::Picture(Picture {
            source: path.to_path_buf(),
            bytes,
            width,
            height,
        }));
        Ok(())
    }

    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    /// Headings as `(level, text)` pairs, in document order.
    pub fn headings(&self) -> impl Iterator<Item = (usize, &str)> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { text, level } => Some((*level, text.as_str())),
            _ => None,
        })
    }

    /// Plain-text rendering, one line per block. Used for logging and assertions.
    pub fn outline(&self) -> String {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Heading { text, level } => format!("{} {text}", "#".repeat(level + 1)),
                Block::Paragraph { runs, style } => {
                    let text: String = runs
                        .iter()
                        .map(|r| if r.line_break { "\\n" } else { r.text.as_str() })
                        .collect();
                    match style {
                        ParagraphStyle::Normal => text,
                        other => format!("[{}] {text}", other.style_id()),
                    }
                }
                Block::Table { rows } => rows
                    .iter()
                    .map(|row| format!("| {} |", row.join(" | ")))
                    .collect::<Vec<_>>()
                    .join("\n"),
                Block::Picture(p) => format!("<picture {}x{}>", p.width, p.height),
                Block::PageBreak => "---".to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Persist the document as a `.docx` package at `path`.
    ///
    /// ## Errors
    /// Fails when the file cannot be created or the package cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let file = fs::File::create(path).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        docx::render(self)
            .build()
            .pack(file)
            .map_err(|e| DocumentError::Package {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), blocks = self.blocks.len(), "document saved");
        Ok(())
    }
}
