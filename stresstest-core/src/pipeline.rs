//! Case Pipeline
//!
//! One test case runs four stages in strict order:
//!
//! ```text
//! Generation ──▶ ReferenceRun ──▶ CandidateRun ──▶ Comparison
//!  gen > test-i.in   brute < in > bruteforce-i.out
//!                                  prog < in > program-i.out
//!                                                   bytes == bytes
//! ```
//!
//! The first failing stage ends the case. Every error is turned into the
//! case's [`CaseReport`]; nothing escapes to abort other cases.

use crate::command::CommandSpec;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::runner::{ProcessRunner, RunError};
use crate::workdir::{CasePaths, WorkDir};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The four sequential steps of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Generator writes the input file
    Generation,
    /// Reference (bruteforce) solution runs on the input
    ReferenceRun,
    /// Candidate solution runs on the input
    CandidateRun,
    /// Both outputs are compared byte for byte
    Comparison,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 4] = [
        Stage::Generation,
        Stage::ReferenceRun,
        Stage::CandidateRun,
        Stage::Comparison,
    ];

    /// Label shown while the stage is running
    pub fn progress_label(self) -> &'static str {
        match self {
            Stage::Generation => "Generating test",
            Stage::ReferenceRun => "Running reference",
            Stage::CandidateRun => "Running candidate",
            Stage::Comparison => "Comparing results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Generation => "generation",
            Stage::ReferenceRun => "reference-run",
            Stage::CandidateRun => "candidate-run",
            Stage::Comparison => "comparison",
        };
        f.write_str(name)
    }
}

/// Reference and candidate outputs that differ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Reference output, unmodified
    pub expected: Vec<u8>,
    /// Candidate output, unmodified
    pub got: Vec<u8>,
}

/// Why a stage failed
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", describe_mismatch(.0))]
    Mismatch(Mismatch),
}

fn describe_mismatch(m: &Mismatch) -> String {
    format!(
        "outputs differ ({} bytes expected, {} bytes got)",
        m.expected.len(),
        m.got.len()
    )
}

impl CaseError {
    /// Mismatched payloads, if this is a wrong answer rather than a crash
    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            CaseError::Mismatch(m) => Some(m),
            _ => None,
        }
    }
}

/// First failure of a case
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    /// Stage that failed
    pub stage: Stage,
    /// Underlying cause
    pub error: CaseError,
}

impl StageFailure {
    fn new(stage: Stage, error: impl Into<CaseError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Outcome of one stage
pub type StageResult = Result<(), StageFailure>;

/// Terminal state of one case: passed, or its first failure
#[derive(Debug)]
pub struct CaseReport {
    /// Case index
    pub index: usize,
    /// `None` when the outputs matched
    pub failure: Option<StageFailure>,
}

impl CaseReport {
    /// Passing case
    pub fn passed(index: usize) -> Self {
        Self {
            index,
            failure: None,
        }
    }

    /// Whether the case passed
    pub fn is_pass(&self) -> bool {
        self.failure.is_none()
    }
}

/// The three programs taking part in every case
#[derive(Debug, Clone)]
pub struct CaseCommands {
    /// Candidate solution under test
    pub program: CommandSpec,
    /// Known-correct (bruteforce) solution
    pub reference: CommandSpec,
    /// Random input generator
    pub generator: CommandSpec,
}

/// Runs individual cases against a shared working directory
pub struct CasePipeline<'a> {
    commands: &'a CaseCommands,
    workdir: &'a WorkDir,
    runner: ProcessRunner,
    progress: &'a dyn ProgressSink,
}

impl<'a> CasePipeline<'a> {
    /// Create a pipeline; cheap, holds only references.
    pub fn new(
        commands: &'a CaseCommands,
        workdir: &'a WorkDir,
        runner: ProcessRunner,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            commands,
            workdir,
            runner,
            progress,
        }
    }

    /// Run case `index` to a terminal state.
    pub fn run_case(&self, index: usize) -> CaseReport {
        let paths = self.workdir.case_paths(index);
        let failure = self.run_stages(index, &paths).err();

        match &failure {
            Some(f) => debug!(case = index, stage = %f.stage, error = %f.error, "case failed"),
            None => debug!(case = index, "case passed"),
        }
        self.progress.emit(ProgressEvent::CaseFinished {
            index,
            passed: failure.is_none(),
        });

        CaseReport { index, failure }
    }

    fn run_stages(&self, index: usize, paths: &CasePaths) -> StageResult {
        self.run_program(
            index,
            Stage::Generation,
            &self.commands.generator,
            None,
            &paths.input,
        )?;
        self.run_program(
            index,
            Stage::ReferenceRun,
            &self.commands.reference,
            Some(&paths.input),
            &paths.reference,
        )?;
        self.run_program(
            index,
            Stage::CandidateRun,
            &self.commands.program,
            Some(&paths.input),
            &paths.candidate,
        )?;

        self.announce(index, Stage::Comparison);
        compare_outputs(&paths.reference, &paths.candidate)
            .map_err(|e| StageFailure::new(Stage::Comparison, e))
    }

    fn run_program(
        &self,
        index: usize,
        stage: Stage,
        command: &CommandSpec,
        stdin: Option<&Path>,
        stdout: &Path,
    ) -> StageResult {
        self.announce(index, stage);

        let stdin = stdin
            .map(|path| {
                File::open(path)
                    .map_err(|e| RunError::stream(format!("opening {}", path.display()), e))
            })
            .transpose()
            .map_err(|e| StageFailure::new(stage, e))?;
        let stdout = File::create(stdout)
            .map_err(|e| RunError::stream(format!("creating {}", stdout.display()), e))
            .map_err(|e| StageFailure::new(stage, e))?;

        self.runner
            .run(command, stdin, stdout)
            .map_err(|e| StageFailure::new(stage, e))
    }

    fn announce(&self, index: usize, stage: Stage) {
        debug!(case = index, %stage, "stage started");
        self.progress.emit(ProgressEvent::StageStarted { index, stage });
    }
}

/// Compare two output files byte for byte.
///
/// A read failure ends the comparison; no partial data is compared.
pub fn compare_outputs(reference: &Path, candidate: &Path) -> Result<(), CaseError> {
    let expected = read_output(reference)?;
    let got = read_output(candidate)?;
    if expected == got {
        Ok(())
    } else {
        Err(CaseError::Mismatch(Mismatch { expected, got }))
    }
}

fn read_output(path: &Path) -> Result<Vec<u8>, CaseError> {
    std::fs::read(path).map_err(|source| CaseError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, RecordingProgress};
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        workdir: WorkDir,
        scripts: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let scripts = tmp.path().join("scripts");
            std::fs::create_dir(&scripts).unwrap();
            let workdir = WorkDir::create(tmp.path().join("generated-tests")).unwrap();
            Self {
                _tmp: tmp,
                workdir,
                scripts,
            }
        }

        fn script(&self, name: &str, body: &str) -> CommandSpec {
            let path = self.scripts.join(name);
            std::fs::write(&path, body).unwrap();
            CommandSpec::script("sh", path)
        }

        fn pipeline<'a>(
            &'a self,
            commands: &'a CaseCommands,
            progress: &'a dyn ProgressSink,
        ) -> CasePipeline<'a> {
            CasePipeline::new(commands, &self.workdir, ProcessRunner::default(), progress)
        }

        fn commands(&self, generator: &str, reference: &str, program: &str) -> CaseCommands {
            CaseCommands {
                generator: self.script("gen.sh", generator),
                reference: self.script("brute.sh", reference),
                program: self.script("prog.sh", program),
            }
        }
    }

    #[test]
    fn test_matching_outputs_pass() {
        let fx = Fixture::new();
        let commands = fx.commands("echo 5\n", "cat\n", "cat\n");
        let pipeline = fx.pipeline(&commands, &NoProgress);

        let report = pipeline.run_case(0);

        assert!(report.is_pass(), "{:?}", report.failure);
        let paths = fx.workdir.case_paths(0);
        assert_eq!(std::fs::read(paths.input).unwrap(), b"5\n");
        assert_eq!(std::fs::read(paths.reference).unwrap(), b"5\n");
        assert_eq!(std::fs::read(paths.candidate).unwrap(), b"5\n");
    }

    #[test]
    fn test_single_byte_difference_is_mismatch() {
        let fx = Fixture::new();
        let commands = fx.commands("echo 7\n", "printf '14\\n'\n", "printf '14 \\n'\n");
        let pipeline = fx.pipeline(&commands, &NoProgress);

        let failure = pipeline.run_case(2).failure.unwrap();

        assert_eq!(failure.stage, Stage::Comparison);
        let mismatch = failure.error.mismatch().unwrap();
        assert_eq!(mismatch.expected, b"14\n");
        assert_eq!(mismatch.got, b"14 \n");
    }

    #[test]
    fn test_generator_failure_skips_runs() {
        let fx = Fixture::new();
        let marker = fx.scripts.join("ran");
        let touch = format!("touch '{}'\ncat\n", marker.display());
        let commands = fx.commands("exit 1\n", &touch, &touch);
        let pipeline = fx.pipeline(&commands, &NoProgress);

        let failure = pipeline.run_case(0).failure.unwrap();

        assert_eq!(failure.stage, Stage::Generation);
        assert!(matches!(failure.error, CaseError::Run(RunError::Exit { .. })));
        assert!(!marker.exists());
        assert!(!fx.workdir.case_paths(0).reference.exists());
    }

    #[test]
    fn test_reference_failure_skips_candidate() {
        let fx = Fixture::new();
        let marker = fx.scripts.join("ran");
        let commands = fx.commands(
            "echo 1\n",
            "exit 2\n",
            &format!("touch '{}'\n", marker.display()),
        );
        let pipeline = fx.pipeline(&commands, &NoProgress);

        let failure = pipeline.run_case(0).failure.unwrap();

        assert_eq!(failure.stage, Stage::ReferenceRun);
        assert!(!marker.exists());
    }

    #[test]
    fn test_candidate_failure_reported_as_candidate_run() {
        let fx = Fixture::new();
        let commands = fx.commands("echo 1\n", "cat\n", "echo oops >&2\nexit 1\n");
        let pipeline = fx.pipeline(&commands, &NoProgress);

        let failure = pipeline.run_case(0).failure.unwrap();

        assert_eq!(failure.stage, Stage::CandidateRun);
        assert!(failure.error.to_string().contains("oops"));
    }

    #[test]
    fn test_progress_labels_in_stage_order() {
        let fx = Fixture::new();
        let commands = fx.commands("echo 1\n", "cat\n", "cat\n");
        let sink = RecordingProgress::new();
        let pipeline = fx.pipeline(&commands, &sink);

        pipeline.run_case(3);

        let stages: Vec<_> = sink
            .events_for(3)
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::StageStarted { stage, .. } => Some(stage.progress_label()),
                ProgressEvent::CaseFinished { .. } => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                "Generating test",
                "Running reference",
                "Running candidate",
                "Comparing results"
            ]
        );
        assert_eq!(
            sink.events_for(3).last(),
            Some(&ProgressEvent::CaseFinished {
                index: 3,
                passed: true
            })
        );
    }

    #[test]
    fn test_compare_read_failure_does_not_compare() {
        let tmp = TempDir::new().unwrap();
        let present = tmp.path().join("a.out");
        std::fs::write(&present, b"1\n").unwrap();

        let err = compare_outputs(&present, &tmp.path().join("missing.out")).unwrap_err();

        assert!(matches!(err, CaseError::Read { .. }));
        assert!(err.mismatch().is_none());
    }
}
