//! Orchestrator
//!
//! Fans `count` independent case pipelines out over a bounded worker pool and
//! collects their reports into a [`RunSummary`] ordered by case index.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use stresstest_core::{
    CaseCommands, CasePipeline, CaseReport, ProcessRunner, ProgressSink, RunSummary, WorkDir,
};
use thiserror::Error;
use tracing::{debug, info};

/// Fatal errors that abort the whole run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Failed to build worker pool: {0}")]
    Pool(String),

    #[error("Case {index} panicked: {message}")]
    CasePanicked { index: usize, message: String },
}

/// Runs every case of a session
pub struct Orchestrator {
    commands: CaseCommands,
    runner: ProcessRunner,
    jobs: usize,
}

impl Orchestrator {
    /// Create an orchestrator. `jobs == 0` uses one worker per core.
    pub fn new(commands: CaseCommands, runner: ProcessRunner, jobs: usize) -> Self {
        Self {
            commands,
            runner,
            jobs,
        }
    }

    /// Run cases `0..count` and wait for all of them to settle.
    ///
    /// Per-case failures end up in the summary. Only a pool that cannot be
    /// built or a panicking case is returned as an error, and only after every
    /// other case has finished.
    pub fn run_all(
        &self,
        count: usize,
        workdir: &WorkDir,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary, OrchestratorError> {
        if count == 0 {
            return Ok(RunSummary::default());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.jobs.min(count))
            .thread_name(|i| format!("stresstest-case-{}", i))
            .build()
            .map_err(|e| OrchestratorError::Pool(e.to_string()))?;
        info!(
            cases = count,
            workers = pool.current_num_threads(),
            dir = %workdir.root().display(),
            "starting run"
        );

        let pipeline = CasePipeline::new(&self.commands, workdir, self.runner, progress);
        let outcomes: Vec<Result<CaseReport, OrchestratorError>> = pool.install(|| {
            (0..count)
                .into_par_iter()
                .map(|index| run_guarded(&pipeline, index))
                .collect()
        });

        let mut reports = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            reports.push(outcome?);
        }
        debug_assert_eq!(reports.len(), count);

        let summary = RunSummary::from_reports(reports);
        debug!(
            passed = summary.passed(),
            failed = summary.failed(),
            "run finished"
        );
        Ok(summary)
    }
}

/// Run one case, turning a panic into a fatal error instead of unwinding
/// through the pool.
fn run_guarded(
    pipeline: &CasePipeline<'_>,
    index: usize,
) -> Result<CaseReport, OrchestratorError> {
    let result =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| pipeline.run_case(index)));

    result.map_err(|panic| {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        OrchestratorError::CasePanicked { index, message }
    })
}
