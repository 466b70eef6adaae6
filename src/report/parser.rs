//! Plain-text execution report parser
//!
//! Reads the output of a runner's "plain" formatter:
//!
//! ```text
//! Feature: Login
//!
//!   Scenario: valid credentials
//!     Given a registered user ... passed in 0.001s
//!     Then the dashboard shows ... passed in 0.000s
//!
//!   Scenario Outline: wrong password -- @1.1 typos
//!     Then an error is shown ... failed in 0.002s
//! ```
//!
//! Bookkeeping is a small state machine:
//!
//! ```text
//! [NoFeature] --Feature--> [InFeature] --Scenario--> [InScenario] --Scenario/Feature/EOF--> flush
//!                                      --malformed outline name--> [SkippedScenario]
//! ```
//!
//! A scenario is flushed (recorded with its last status, `skipped` when it never got one) when
//! the next marker or the end of input is reached.

use std::collections::BTreeMap;
use std::fmt;

use featuredoc_syntax::OutlineName;

use super::summary::ReportTotals;

const OUTLINE_KEYWORDS: [&str; 2] = ["Scenario Outline", "Scenario Template"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

impl ScenarioStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report line, classified, with trailing whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Feature(String),
    Scenario(String),
    Status(String),
    Text(String),
}

impl ReportLine {
    /// Classify a raw line. Order matters: a scenario line mentioning "passed" is a scenario.
    pub fn classify(raw: &str) -> Self {
        let line = raw.trim_end().to_string();
        if line.starts_with("Feature") {
            ReportLine::Feature(line)
        } else if line.trim_start().starts_with("Scenario") {
            ReportLine::Scenario(line)
        } else if line.contains("passed") || line.contains("failed") {
            ReportLine::Status(line)
        } else {
            ReportLine::Text(line)
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ReportLine::Feature(t) | ReportLine::Scenario(t) | ReportLine::Status(t) | ReportLine::Text(t) => t,
        }
    }
}

/// Per-feature, per-scenario final statuses plus totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub features: BTreeMap<String, BTreeMap<String, ScenarioStatus>>,
    pub totals: ReportTotals,
}

impl ExecutionReport {
    /// Rows of the summary table, sorted by feature then scenario.
    pub fn table_rows(&self) -> Vec<[String; 3]> {
        let mut rows = Vec::new();
        for (feature, scenarios) in &self.features {
            if scenarios.is_empty() {
                rows.push([feature.clone(), String::new(), "No scenario to report".to_string()]);
            }
            for (scenario, status) in scenarios {
                rows.push([feature.clone(), scenario.clone(), status.to_string()]);
            }
        }
        rows
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub lines: Vec<ReportLine>,
    pub report: ExecutionReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    NoFeature,
    InFeature {
        feature: String,
    },
    InScenario {
        feature: String,
        scenario: String,
        status: ScenarioStatus,
    },
    /// Inside a scenario that is rendered but not tallied.
    SkippedScenario {
        feature: String,
    },
}

/// The report under construction and the state machine driving it.
#[derive(Debug)]
struct Accumulator {
    state: State,
    report: ExecutionReport,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            state: State::NoFeature,
            report: ExecutionReport::default(),
        }
    }

    /// Record the scenario in progress, if any, and return the enclosing feature.
    fn flush(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, State::NoFeature) {
            State::NoFeature => None,
            State::InFeature { feature } | State::SkippedScenario { feature } => Some(feature),
            State::InScenario {
                feature,
                scenario,
                status,
            } => {
                tracing::debug!(%feature, %scenario, %status, "scenario closed");
                self.report.totals.record(status);
                let scenarios = self.report.features.entry(feature.clone()).or_default();
                if let Some(previous) = scenarios.insert(scenario, status) {
                    tracing::warn!(
                        %feature,
                        %previous,
                        "duplicate scenario name, only the last run is listed in the table"
                    );
                }
                Some(feature)
            }
        }
    }

    fn feature(&mut self, line: &str) {
        self.flush();
        let feature = marker_name(line).to_string();
        self.report.features.entry(feature.clone()).or_default();
        self.state = State::InFeature { feature };
    }

    fn scenario(&mut self, line: &str) {
        let Some(feature) = self.flush() else {
            tracing::warn!(line, "scenario outside of any feature, not tallied");
            return;
        };

        self.state = match scenario_identifier(line) {
            Ok(scenario) => State::InScenario {
                feature,
                scenario,
                status: ScenarioStatus::Skipped,
            },
            Err(e) => {
                tracing::warn!(%feature, error = %e, "scenario skipped");
                State::SkippedScenario { feature }
            }
        };
    }

    fn status(&mut self, line: &str) {
        if let State::InScenario { status, .. } = &mut self.state {
            *status = if line.contains("passed") {
                ScenarioStatus::Passed
            } else {
                ScenarioStatus::Failed
            };
        }
    }

    fn finish(mut self) -> ExecutionReport {
        self.flush();
        self.report
    }
}

/// Text after the first `:` of a marker line.
fn marker_name(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, name)| name.trim())
}

/// Table key of a scenario line; outline names are split into their parts.
fn scenario_identifier(line: &str) -> Result<String, featuredoc_syntax::OutlineNameError> {
    let keyword = line.split_once(':').map_or(line, |(keyword, _)| keyword).trim();
    let name = marker_name(line);
    if OUTLINE_KEYWORDS.contains(&keyword) {
        OutlineName::parse(name).map(|outline| outline.identifier())
    } else {
        Ok(name.to_string())
    }
}

/// Parse a plain report into its classified lines and aggregate.
#[tracing::instrument(skip_all, fields(report_len = text.len()))]
pub fn parse_report(text: &str) -> ParsedReport {
    let mut accumulator = Accumulator::new();
    let mut lines = Vec::new();

    for raw in text.lines() {
        let line = ReportLine::classify(raw);
        match &line {
            ReportLine::Feature(t) => accumulator.feature(t),
            ReportLine::Scenario(t) => accumulator.scenario(t),
            ReportLine::Status(t) => accumulator.status(t),
            ReportLine::Text(_) => {}
        }
        lines.push(line);
    }

    ParsedReport {
        lines,
        report: accumulator.finish(),
    }
}
