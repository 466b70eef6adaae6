//! Document assembly
//!
//! Walks the feature repository and writes the living documentation:
//!
//! 1. title heading, page break
//! 2. forewords (optional)
//! 3. "Living documentation" heading, when a report or forewords are included
//! 4. one section per `.feature` file, in sorted path order
//! 5. execution report and summary (optional)
//!
//! ## Notes
//!
//! - Configuration problems fail before any file is read.
//! - A feature file that cannot be read or parsed is logged, recorded in
//!   [`AssemblyOutcome::skipped`] and left out; the run goes on.
//! - Generated pictures live in a scratch directory that is removed when assembly returns.

pub mod sections;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use featuredoc_syntax::parse_file;
use thiserror::Error;

use crate::config::{ConfigError, GenerateConfig};
use crate::diagram::{DiagramRenderer, DiagramResolver, PlantUmlRenderer};
use crate::document::{Document, DocumentError};
use crate::forewords::{ForewordsError, insert_forewords};
use crate::report::{ChartRenderer, PieChartRenderer, ReportError, ReportTotals, render_report};

pub use sections::SectionContext;

pub const LIVING_DOCUMENTATION_HEADING: &str = "Living documentation";

const FEATURE_EXTENSION: &str = "feature";
const SKIPPED_DIRECTORIES: &[&str] = &["target"];

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] io::Error),

    #[error(transparent)]
    Forewords(#[from] ForewordsError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Save(#[from] DocumentError),
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssemblyOutcome {
    /// Feature sections written.
    pub features: usize,
    pub scenarios: usize,
    /// Feature files left out because they could not be read or parsed.
    pub skipped: Vec<PathBuf>,
    /// Execution report totals, when a report was included.
    pub totals: Option<ReportTotals>,
    pub output: PathBuf,
}

/// Builds the document for one configuration. Renderers can be swapped for tests.
pub struct DocumentAssembler {
    config: GenerateConfig,
    renderer: Option<Box<dyn DiagramRenderer>>,
    chart: Box<dyn ChartRenderer>,
}

impl DocumentAssembler {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            renderer: None,
            chart: Box::new(PieChartRenderer),
        }
    }

    /// Use `renderer` instead of PlantUML.
    pub fn with_renderer(mut self, renderer: Box<dyn DiagramRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_chart(mut self, chart: Box<dyn ChartRenderer>) -> Self {
        self.chart = chart;
        self
    }

    /// Build the document in memory without saving it.
    #[tracing::instrument(skip_all, fields(repository = %self.config.repository.display()))]
    pub fn build(self) -> Result<(Document, AssemblyOutcome), AssemblyError> {
        let Self {
            config,
            renderer,
            chart,
        } = self;
        config.validate()?;

        let scratch = tempfile::Builder::new()
            .prefix("featuredoc-")
            .tempdir()
            .map_err(AssemblyError::Scratch)?;
        let renderer = renderer.unwrap_or_else(|| Box::new(PlantUmlRenderer::new(config.plantuml_jar_path())));
        let resolver = DiagramResolver::new(renderer, scratch.path(), config.diagram_timeout);

        let mut document = Document::new();
        let mut outcome = AssemblyOutcome {
            output: config.output_path(),
            ..AssemblyOutcome::default()
        };

        document.add_heading(config.title.as_str(), 0);
        document.add_page_break();

        if let Some(folder) = &config.forewords {
            insert_forewords(&mut document, folder, &resolver)?;
        }

        let levels = config.heading_levels();
        if levels.offset() > 0 {
            document.add_heading(LIVING_DOCUMENTATION_HEADING, 1);
        }

        let ctx = SectionContext {
            levels,
            tag_prefix: config.tag_prefix.as_deref(),
            repository: &config.repository,
            resolver: &resolver,
        };
        for path in discover_features(&config.repository) {
            tracing::info!(path = %path.display(), "computing feature file");
            match parse_file(&path) {
                Ok(feature) => {
                    sections::feature_section(&mut document, &feature, &ctx);
                    outcome.features += 1;
                    outcome.scenarios += feature.scenarios.len();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feature file skipped");
                    outcome.skipped.push(path);
                }
            }
        }

        if let Some(report) = &config.report {
            outcome.totals = Some(render_report(&mut document, report, chart.as_ref(), scratch.path())?);
        }

        tracing::info!(
            features = outcome.features,
            scenarios = outcome.scenarios,
            skipped = outcome.skipped.len(),
            "document assembled"
        );
        Ok((document, outcome))
    }

    /// Build the document and save it to the configured output.
    pub fn assemble(self) -> Result<AssemblyOutcome, AssemblyError> {
        let (document, outcome) = self.build()?;
        document.save(&outcome.output)?;
        tracing::info!(output = %outcome.output.display(), "processing done");
        Ok(outcome)
    }
}

/// Build and save the document for `config` with the default renderers.
///
/// ## Errors
/// Configuration problems, an unreadable forewords folder or report, and save failures.
pub fn assemble(config: &GenerateConfig) -> Result<AssemblyOutcome, AssemblyError> {
    DocumentAssembler::new(config.clone()).assemble()
}

/// In-memory variant of [`assemble`].
pub fn build_document(config: &GenerateConfig) -> Result<(Document, AssemblyOutcome), AssemblyError> {
    DocumentAssembler::new(config.clone()).build()
}

/// Every `.feature` file under `root`, sorted. Hidden directories and `target` are not visited.
pub fn discover_features(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "directory not readable");
                continue;
            }
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                if !is_skipped_directory(&path) {
                    pending.push(path);
                }
            } else if path.extension().is_some_and(|ext| ext == FEATURE_EXTENSION) {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

fn is_skipped_directory(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&name.as_ref()))
}
