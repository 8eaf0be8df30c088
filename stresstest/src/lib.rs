#![warn(missing_docs)]
//! # Stresstest
//!
//! Differential stress testing for competitive-programming solutions.
//!
//! Stresstest generates random inputs, runs a known-correct ("bruteforce")
//! solution and a candidate solution on each one, and reports every input
//! where their outputs differ:
//! - **Case Isolation**: every case runs Generate → Reference → Candidate → Compare on its own; one failure never aborts another case
//! - **Byte-Exact Comparison**: outputs must match exactly, the way judges compare them
//! - **Concurrent Cases**: cases fan out over a bounded worker pool
//! - **Deterministic Reports**: failures are listed by case index, whatever order cases finished in
//!
//! ## Quick Start
//!
//! ```text
//! stresstest test solution.py brute.py gen.py --count 100
//! stresstest test ./sol ./brute ./gen --exe --jobs 4 --timeout 2s
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use stresstest::prelude::*;
//!
//! let commands = CaseCommands {
//!     program: CommandSpec::python("sol.py", true),
//!     reference: CommandSpec::python("brute.py", true),
//!     generator: CommandSpec::python("gen.py", true),
//! };
//! let workdir = WorkDir::create("generated-tests")?;
//! let summary = Orchestrator::new(commands, ProcessRunner::default(), 0)
//!     .run_all(100, &workdir, &NoProgress)?;
//! print!("{}", render_plain(&summary));
//! ```

// Re-export core types
pub use stresstest_core::{
    CaseCommands, CaseError, CasePaths, CasePipeline, CaseReport, CommandSpec, Mismatch,
    NoProgress, ProcessRunner, ProgressEvent, ProgressSink, RecordingProgress, RunError,
    RunSummary, Stage, StageFailure, StageResult, TracingProgress, WorkDir, compare_outputs,
};

// Re-export reporting
pub use stresstest_report::{
    JsonReport, LineKind, OutputFormat, ReportLine, failure_label, generate_json_report, render,
    render_plain,
};

// Re-export orchestration
pub use stresstest_cli::{Orchestrator, OrchestratorError, RunSettings, StressConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CaseCommands, CommandSpec, NoProgress, Orchestrator, ProcessRunner, RunSummary, Stage,
        WorkDir, render_plain,
    };
}

/// Run the Stresstest CLI.
///
/// ```ignore
/// fn main() -> std::process::ExitCode {
///     stresstest::run().unwrap_or(std::process::ExitCode::FAILURE)
/// }
/// ```
pub use stresstest_cli::run;
