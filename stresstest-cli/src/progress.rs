//! Console Progress
//!
//! Renders progress events as a single `indicatif` bar: position counts
//! finished cases, the message shows the most recent stage started.

use indicatif::{ProgressBar, ProgressStyle};
use stresstest_core::{ProgressEvent, ProgressSink};

/// Progress bar over all cases of a run
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// Bar for `count` cases, drawn on stderr.
    pub fn new(count: usize) -> Self {
        let bar = ProgressBar::new(count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// Bar that never draws, for non-interactive output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Stop the bar, leaving `message` behind.
    pub fn finish(&self, message: impl Into<String>) {
        self.bar.finish_with_message(message.into());
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { index, stage } => {
                self.bar
                    .set_message(format!("Test {}: {}", index, stage.progress_label()));
            }
            ProgressEvent::CaseFinished { .. } => self.bar.inc(1),
        }
    }
}
