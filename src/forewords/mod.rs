//! Forewords
//!
//! Free-form Markdown chapters placed before the living documentation. Every `*.md` file of the
//! forewords folder becomes part of a "Forewords" section, in file name order.
//!
//! ## Notes
//!
//! - Headings of a foreword are nested one level below the "Forewords" heading.
//! - Pictures, inline `puml` blocks and `!!Workflow:` directives are resolved relative to the
//!   forewords folder (see [`crate::rewrite`]).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::diagram::DiagramResolver;
use crate::document::Document;
use crate::markup::insert_markup;
use crate::rewrite;

pub const FOREWORDS_HEADING: &str = "Forewords";

#[derive(Debug, Error)]
pub enum ForewordsError {
    #[error("cannot list forewords folder {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The `*.md` files of `folder`, sorted by file name. Subfolders are not visited.
pub fn foreword_files(folder: &Path) -> Result<Vec<PathBuf>, ForewordsError> {
    let entries = fs::read_dir(folder).map_err(|source| ForewordsError::List {
        path: folder.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Run the foreword text passes in order.
pub fn preprocess(markdown: &str, folder: &Path, resolver: &DiagramResolver) -> String {
    let text = rewrite::shift_headings(markdown);
    let text = rewrite::rewrite_pictures(&text, folder, resolver);
    let text = rewrite::render_inline_diagrams(&text, resolver);
    rewrite::rewrite_workflows(&text, folder, resolver)
}

/// Append the "Forewords" section followed by a page break. Returns the number of files inserted.
///
/// A file that cannot be read is logged and skipped.
pub fn insert_forewords(
    document: &mut Document,
    folder: &Path,
    resolver: &DiagramResolver,
) -> Result<usize, ForewordsError> {
    let files = foreword_files(folder)?;
    document.add_heading(FOREWORDS_HEADING, 1);

    let mut inserted = 0;
    for file in &files {
        let markdown = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "foreword skipped");
                continue;
            }
        };
        tracing::info!(path = %file.display(), "inserting foreword");
        insert_markup(document, &preprocess(&markdown, folder, resolver));
        inserted += 1;
    }

    document.add_page_break();
    Ok(inserted)
}
