//! Human Report Rendering
//!
//! Turns a [`RunSummary`] into display lines, one block per failed case in
//! index order. Passing cases produce no lines. Each line carries a
//! [`LineKind`] so a terminal front end can style it without re-parsing.

use stresstest_core::{CaseError, RunSummary, Stage, StageFailure};

/// Role of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Separator between case blocks
    Blank,
    /// `Test id: Test {i}`
    CaseId,
    /// Stage label such as `Bad result`
    Label,
    /// Underlying cause, possibly one of several lines
    Cause,
    /// Closing pass/fail count
    Summary,
}

/// One line of the human report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Role of the line
    pub kind: LineKind,
    /// Text without trailing newline
    pub text: String,
}

impl ReportLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Marker printed before the candidate output of a wrong answer
pub const GOT_MARKER: &str = "---->Got:";
/// Marker printed before the reference output of a wrong answer
pub const EXPECTED_MARKER: &str = "---->But Expected:";

/// Human label for the stage a case failed in
pub fn failure_label(failure: &StageFailure) -> &'static str {
    match (failure.stage, &failure.error) {
        (Stage::Generation, _) => "Error while generating test",
        (Stage::ReferenceRun, _) => "Error while running reference",
        (Stage::CandidateRun, _) => "Error while running your program",
        (Stage::Comparison, CaseError::Mismatch(_)) => "Bad result",
        (Stage::Comparison, _) => "Error while comparing results",
    }
}

/// Render every failed case, followed by a count line when anything failed.
pub fn render(summary: &RunSummary) -> Vec<ReportLine> {
    let mut lines = Vec::new();

    for (index, failure) in summary.failures() {
        lines.push(ReportLine::new(LineKind::Blank, ""));
        lines.push(ReportLine::new(
            LineKind::CaseId,
            format!("Test id: Test {}", index),
        ));
        lines.push(ReportLine::new(LineKind::Label, failure_label(failure)));

        match failure.error.mismatch() {
            Some(mismatch) => {
                lines.push(ReportLine::new(LineKind::Cause, GOT_MARKER));
                push_payload(&mut lines, &mismatch.got);
                lines.push(ReportLine::new(LineKind::Cause, EXPECTED_MARKER));
                push_payload(&mut lines, &mismatch.expected);
            }
            None => {
                for text in failure.error.to_string().lines() {
                    lines.push(ReportLine::new(LineKind::Cause, text));
                }
            }
        }
    }

    if !summary.all_passed() {
        lines.push(ReportLine::new(LineKind::Blank, ""));
        lines.push(ReportLine::new(LineKind::Summary, summary_text(summary)));
    }

    lines
}

/// `"{passed}/{total} tests passed"`
pub fn summary_text(summary: &RunSummary) -> String {
    format!("{}/{} tests passed", summary.passed(), summary.len())
}

/// Render to a single newline-terminated string without styling.
pub fn render_plain(summary: &RunSummary) -> String {
    let mut output = String::new();
    for line in render(summary) {
        output.push_str(&line.text);
        output.push('\n');
    }
    output
}

/// Printed after a payload whose last line has no terminating newline
pub const NO_FINAL_NEWLINE: &str = "\\ No newline at end of output";

/// One line per `\n`-terminated chunk. Carriage returns are shown as `\r`
/// and a missing final newline gets its own marker line.
fn push_payload(lines: &mut Vec<ReportLine>, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    for chunk in text.split_inclusive('\n') {
        let (line, terminated) = match chunk.strip_suffix('\n') {
            Some(line) => (line, true),
            None => (chunk, false),
        };
        lines.push(ReportLine::new(LineKind::Cause, line.replace('\r', "\\r")));
        if !terminated {
            lines.push(ReportLine::new(LineKind::Cause, NO_FINAL_NEWLINE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stresstest_core::{CaseReport, Mismatch, RunError};

    fn failed(index: usize, stage: Stage, error: CaseError) -> CaseReport {
        CaseReport {
            index,
            failure: Some(StageFailure { stage, error }),
        }
    }

    fn spawn_error() -> CaseError {
        CaseError::Run(RunError::Spawn {
            command: "python gen.py".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    }

    fn texts(lines: &[ReportLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_all_passing_renders_nothing() {
        let summary =
            RunSummary::from_reports(vec![CaseReport::passed(0), CaseReport::passed(1)]);
        assert!(render(&summary).is_empty());
        assert_eq!(render_plain(&summary), "");
    }

    #[test]
    fn test_mismatch_block() {
        let summary = RunSummary::from_reports(vec![
            CaseReport::passed(0),
            failed(
                1,
                Stage::Comparison,
                CaseError::Mismatch(Mismatch {
                    expected: b"4\n".to_vec(),
                    got: b"5\n".to_vec(),
                }),
            ),
        ]);

        let lines = render(&summary);

        assert_eq!(
            texts(&lines),
            vec![
                "",
                "Test id: Test 1",
                "Bad result",
                "---->Got:",
                "5",
                "---->But Expected:",
                "4",
                "",
                "1/2 tests passed",
            ]
        );
        assert_eq!(lines[1].kind, LineKind::CaseId);
        assert_eq!(lines[2].kind, LineKind::Label);
        assert_eq!(lines[8].kind, LineKind::Summary);
    }

    fn mismatch_lines(expected: &[u8], got: &[u8]) -> Vec<String> {
        let summary = RunSummary::from_reports(vec![failed(
            0,
            Stage::Comparison,
            CaseError::Mismatch(Mismatch {
                expected: expected.to_vec(),
                got: got.to_vec(),
            }),
        )]);
        render(&summary).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_carriage_return_is_visible() {
        let lines = mismatch_lines(b"4\n", b"4\r\n");
        assert_eq!(
            lines[3..7],
            ["---->Got:", "4\\r", "---->But Expected:", "4"]
        );
    }

    #[test]
    fn test_missing_final_newline_is_marked() {
        let lines = mismatch_lines(b"4\n", b"4");
        assert_eq!(
            lines[3..7],
            ["---->Got:", "4", NO_FINAL_NEWLINE, "---->But Expected:"]
        );
        assert_eq!(lines[7], "4");
        assert_ne!(lines[8], NO_FINAL_NEWLINE);
    }

    #[test]
    fn test_empty_output_differs_from_blank_line() {
        let lines = mismatch_lines(b"\n", b"");
        assert_eq!(
            lines[3..6],
            ["---->Got:", "---->But Expected:", ""]
        );
    }

    #[test]
    fn test_labels_per_stage() {
        let cases = [
            (Stage::Generation, "Error while generating test"),
            (Stage::ReferenceRun, "Error while running reference"),
            (Stage::CandidateRun, "Error while running your program"),
        ];
        for (stage, label) in cases {
            let failure = StageFailure {
                stage,
                error: spawn_error(),
            };
            assert_eq!(failure_label(&failure), label);
        }

        let read = StageFailure {
            stage: Stage::Comparison,
            error: CaseError::Read {
                path: "generated-tests/program-0.out".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            },
        };
        assert_eq!(failure_label(&read), "Error while comparing results");
    }

    #[test]
    fn test_failures_rendered_in_index_order_with_cause() {
        let summary = RunSummary::from_reports(vec![
            failed(3, Stage::CandidateRun, spawn_error()),
            failed(0, Stage::Generation, spawn_error()),
        ]);

        let lines = render(&summary);
        let ids: Vec<_> = lines
            .iter()
            .filter(|l| l.kind == LineKind::CaseId)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(ids, vec!["Test id: Test 0", "Test id: Test 3"]);

        let causes: Vec<_> = lines.iter().filter(|l| l.kind == LineKind::Cause).collect();
        assert!(causes[0].text.contains("failed to launch `python gen.py`"));
    }
}
