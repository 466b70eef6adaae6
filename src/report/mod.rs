//! Execution report section
//!
//! Reads a plain-text execution report and appends two sections to the document: the report
//! itself ("Last Execution report") and its summary ("Last Execution summary": pie chart, legend
//! and a `Feature | Scenario | Status` table).
//!
//! ## Modules
//!
//! - `parser` - Line classification and the bookkeeping state machine
//! - `summary` - Totals and percentage buckets
//! - `chart` - Pie chart rendering

pub mod chart;
pub mod parser;
pub mod summary;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::{Document, ParagraphStyle};

pub use chart::{ChartRenderer, PieChartRenderer};
pub use parser::{ExecutionReport, ParsedReport, ReportLine, ScenarioStatus, parse_report};
pub use summary::{Buckets, ReportTotals};

pub const REPORT_HEADING: &str = "Last Execution report";
pub const SUMMARY_HEADING: &str = "Last Execution summary";
pub const NOTHING_EXECUTED: &str = "No scenario executed";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot read execution report {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read `report_path` and append the report and summary sections.
///
/// The chart picture is written to `scratch`; if it cannot be produced the legend is still
/// rendered.
///
/// ## Errors
/// Fails only when the report cannot be read.
pub fn render_report(
    document: &mut Document,
    report_path: &Path,
    chart: &dyn ChartRenderer,
    scratch: &Path,
) -> Result<ReportTotals, ReportError> {
    let text = fs::read_to_string(report_path).map_err(|source| ReportError::Read {
        path: report_path.to_path_buf(),
        source,
    })?;
    let parsed = parse_report(&text);
    tracing::info!(
        path = %report_path.display(),
        features = parsed.report.features.len(),
        scenarios = parsed.report.totals.total,
        "execution report parsed"
    );

    render_lines(document, &parsed.lines);
    document.add_page_break();
    render_summary(document, &parsed.report, chart, scratch);
    Ok(parsed.report.totals)
}

/// The report body: features as h2 (each after a page break but the first), scenarios as h3,
/// everything else verbatim.
pub fn render_lines(document: &mut Document, lines: &[ReportLine]) {
    document.add_heading(REPORT_HEADING, 1);
    let mut first_feature = true;
    for line in lines {
        match line {
            ReportLine::Feature(text) => {
                if !first_feature {
                    document.add_page_break();
                }
                first_feature = false;
                document.add_heading(text.as_str(), 2);
            }
            ReportLine::Scenario(text) => document.add_heading(text.trim(), 3),
            ReportLine::Status(text) | ReportLine::Text(text) => {
                document.add_text(text.as_str(), ParagraphStyle::NoSpacing);
            }
        }
    }
}

pub fn render_summary(document: &mut Document, report: &ExecutionReport, chart: &dyn ChartRenderer, scratch: &Path) {
    document.add_heading(SUMMARY_HEADING, 1);

    match Buckets::from_totals(&report.totals) {
        None => document.add_text(NOTHING_EXECUTED, ParagraphStyle::Normal),
        Some(buckets) => {
            let path = scratch.join("result.png");
            let drawn = chart
                .render(&buckets, &path)
                .map_err(|e| e.to_string())
                .and_then(|()| document.add_picture(&path, None).map_err(|e| e.to_string()));
            if let Err(e) = drawn {
                tracing::warn!(error = %e, "summary chart not embedded");
            }
            document.add_text(buckets.legend(&report.totals), ParagraphStyle::Normal);
        }
    }

    let mut rows = vec![vec!["Feature".to_string(), "Scenario".to_string(), "Status".to_string()]];
    rows.extend(report.table_rows().into_iter().map(Vec::from));
    document.add_table(rows);
}
