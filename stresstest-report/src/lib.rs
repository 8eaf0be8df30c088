#![warn(missing_docs)]
//! Stresstest Report - Failure Reporting
//!
//! Renders a finished run:
//! - Human (display lines tagged for terminal styling)
//! - JSON (machine-readable)

mod json;
mod render;

pub use json::{FailureEntry, JsonReport, ReportMeta, generate_json_report};
pub use render::{
    EXPECTED_MARKER, GOT_MARKER, LineKind, NO_FINAL_NEWLINE, ReportLine, failure_label, render,
    render_plain, summary_text,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON with full schema
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("Human".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
