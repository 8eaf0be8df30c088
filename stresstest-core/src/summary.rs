//! Run Summary
//!
//! Per-case reports of a whole run, always ordered by case index regardless
//! of the order in which cases finished.

use crate::pipeline::{CaseReport, StageFailure};

/// Reports for every case of a run, indexed `0..len`
#[derive(Debug, Default)]
pub struct RunSummary {
    reports: Vec<CaseReport>,
}

impl RunSummary {
    /// Build a summary from reports in any order.
    pub fn from_reports(mut reports: Vec<CaseReport>) -> Self {
        reports.sort_by_key(|r| r.index);
        Self { reports }
    }

    /// Number of case slots
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the run had zero cases
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// All reports in index order
    pub fn reports(&self) -> &[CaseReport] {
        &self.reports
    }

    /// Failed cases in index order
    pub fn failures(&self) -> impl Iterator<Item = (usize, &StageFailure)> {
        self.reports
            .iter()
            .filter_map(|r| r.failure.as_ref().map(|f| (r.index, f)))
    }

    /// Count of passing cases
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_pass()).count()
    }

    /// Count of failing cases
    pub fn failed(&self) -> usize {
        self.len() - self.passed()
    }

    /// Whether every case passed
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(CaseReport::is_pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_sorted_by_index() {
        let summary = RunSummary::from_reports(vec![
            CaseReport::passed(2),
            CaseReport::passed(0),
            CaseReport::passed(1),
        ]);

        let indices: Vec<_> = summary.reports().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(summary.passed(), 3);
        assert_eq!(summary.failed(), 0);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::default();
        assert!(summary.is_empty());
        assert!(summary.all_passed());
        assert_eq!(summary.failures().count(), 0);
    }
}
