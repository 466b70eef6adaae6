//! Totals and percentage buckets of an execution report.

use super::parser::ScenarioStatus;

/// Scenario counts of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ReportTotals {
    pub fn record(&mut self, status: ScenarioStatus) {
        self.total += 1;
        match status {
            ScenarioStatus::Passed => self.succeeded += 1,
            ScenarioStatus::Failed => self.failed += 1,
            ScenarioStatus::Skipped => self.skipped += 1,
        }
    }
}

/// Integer percentages of the three outcomes. Always sums to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buckets {
    pub succeeded: u32,
    pub failed: u32,
    pub skipped: u32,
}

impl Buckets {
    /// Percentages of `totals`, or `None` when nothing was executed.
    ///
    /// Succeeded and failed are truncated; skipped takes the remainder. Counts that do not add
    /// up (more successes and failures than scenarios) are clamped rather than going negative.
    pub fn from_totals(totals: &ReportTotals) -> Option<Self> {
        if totals.total == 0 {
            return None;
        }
        let percent = |count: usize| -> u32 {
            let p = count.saturating_mul(100) / totals.total;
            u32::try_from(p).unwrap_or(u32::MAX).min(100)
        };
        let succeeded = percent(totals.succeeded);
        let failed = percent(totals.failed).min(100 - succeeded);
        Some(Self {
            succeeded,
            failed,
            skipped: 100 - succeeded - failed,
        })
    }

    /// Legend text placed under the chart.
    pub fn legend(&self, totals: &ReportTotals) -> String {
        format!(
            "Succeeded: {}% ({}), Failed: {}% ({}), Skipped: {}% ({})",
            self.succeeded,
            totals.succeeded,
            self.failed,
            totals.failed,
            self.skipped,
            totals.total.saturating_sub(totals.succeeded + totals.failed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(total: usize, succeeded: usize, failed: usize) -> ReportTotals {
        ReportTotals {
            total,
            succeeded,
            failed,
            skipped: total.saturating_sub(succeeded + failed),
        }
    }

    #[test]
    fn test_seven_two_one() {
        let b = Buckets::from_totals(&totals(10, 7, 2)).unwrap();
        assert_eq!((b.succeeded, b.failed, b.skipped), (70, 20, 10));
    }

    #[test]
    fn test_rounding_goes_to_skipped() {
        let b = Buckets::from_totals(&totals(3, 1, 1)).unwrap();
        assert_eq!((b.succeeded, b.failed, b.skipped), (33, 33, 34));
    }

    #[test]
    fn test_inconsistent_counts_are_clamped() {
        let b = Buckets::from_totals(&totals(2, 2, 2)).unwrap();
        assert_eq!((b.succeeded, b.failed, b.skipped), (100, 0, 0));
    }

    #[test]
    fn test_nothing_executed() {
        assert_eq!(Buckets::from_totals(&ReportTotals::default()), None);
    }

    #[test]
    fn test_record() {
        let mut t = ReportTotals::default();
        t.record(ScenarioStatus::Passed);
        t.record(ScenarioStatus::Skipped);
        assert_eq!(t, totals(2, 1, 0));
    }

    #[test]
    fn test_legend() {
        let t = totals(10, 7, 2);
        let b = Buckets::from_totals(&t).unwrap();
        assert_eq!(b.legend(&t), "Succeeded: 70% (7), Failed: 20% (2), Skipped: 10% (1)");
    }
}
