//! JSON Output

use crate::render::failure_label;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stresstest_core::{RunSummary, Stage};

/// Machine-readable run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Report metadata
    pub meta: ReportMeta,
    /// Total number of cases
    pub total: usize,
    /// Cases that passed
    pub passed: usize,
    /// Cases that failed
    pub failed: usize,
    /// One entry per failed case, in index order
    pub failures: Vec<FailureEntry>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Tool version
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
}

/// A failed case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Case index
    pub index: usize,
    /// Stage that failed
    pub stage: Stage,
    /// Human label for the failure
    pub label: String,
    /// Error text
    pub message: String,
    /// Reference output of a wrong answer (lossy UTF-8)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Candidate output of a wrong answer (lossy UTF-8)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub got: Option<String>,
    /// `expected` or `got` was not valid UTF-8 and had bytes replaced
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lossy: bool,
}

impl JsonReport {
    /// Build the report for `summary`.
    pub fn from_summary(summary: &RunSummary) -> Self {
        let failures = summary
            .failures()
            .map(|(index, failure)| {
                let mismatch = failure.error.mismatch();
                FailureEntry {
                    index,
                    stage: failure.stage,
                    label: failure_label(failure).to_string(),
                    message: failure.error.to_string(),
                    expected: mismatch.map(|m| String::from_utf8_lossy(&m.expected).into_owned()),
                    got: mismatch.map(|m| String::from_utf8_lossy(&m.got).into_owned()),
                    lossy: mismatch.is_some_and(|m| {
                        std::str::from_utf8(&m.expected).is_err()
                            || std::str::from_utf8(&m.got).is_err()
                    }),
                }
            })
            .collect();

        Self {
            meta: ReportMeta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: Utc::now(),
            },
            total: summary.len(),
            passed: summary.passed(),
            failed: summary.failed(),
            failures,
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(summary: &RunSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport::from_summary(summary))
}
