#![forbid(unsafe_code)]
//! featuredoc: living documentation from Gherkin feature files
//!
//! Walks a tree of `.feature` files and writes a Word document with one section per feature,
//! optionally preceded by Markdown forewords and followed by the summary of a plain execution
//! report. PlantUML diagrams referenced from descriptions are rendered and embedded.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod assembler;
pub mod cli;
pub mod config;
pub mod diagram;
pub mod document;
pub mod forewords;
pub mod markup;
pub mod report;
pub mod rewrite;
pub mod version;

pub use featuredoc_syntax as syntax;

pub use assembler::{AssemblyError, AssemblyOutcome, DocumentAssembler, assemble, build_document};
pub use config::{ConfigError, GenerateConfig, HeadingLevels};
pub use document::{Document, DocumentError};
