#![warn(missing_docs)]
//! Stresstest Core - Case Engine
//!
//! This crate provides the per-case machinery of a differential stress test:
//! - `ProcessRunner` for launching generator/reference/candidate programs
//! - `CasePipeline` for the Generate → Reference → Candidate → Compare chain
//! - `WorkDir` for the shared directory of per-case artifacts
//! - `ProgressSink` for observing stage transitions

mod command;
mod pipeline;
mod progress;
mod runner;
mod summary;
mod workdir;

pub use command::{CommandSpec, DEFAULT_INTERPRETER};
pub use pipeline::{
    CaseCommands, CaseError, CasePipeline, CaseReport, Mismatch, Stage, StageFailure,
    StageResult, compare_outputs,
};
pub use progress::{NoProgress, ProgressEvent, ProgressSink, RecordingProgress, TracingProgress};
pub use runner::{ProcessRunner, RunError};
pub use summary::RunSummary;
pub use workdir::{CasePaths, DEFAULT_WORK_DIR, WorkDir};
