//! Progress Events
//!
//! Case pipelines announce each stage to a [`ProgressSink`]. Sinks only
//! observe; nothing they do feeds back into control flow.

use crate::pipeline::Stage;
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use tracing::info;

/// Something a case pipeline reports while it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A stage of case `index` is about to start
    StageStarted {
        /// Case index
        index: usize,
        /// Stage about to run
        stage: Stage,
    },
    /// Case `index` reached a terminal state
    CaseFinished {
        /// Case index
        index: usize,
        /// Whether the case passed
        passed: bool,
    },
}

impl ProgressEvent {
    /// Case the event belongs to
    pub fn index(&self) -> usize {
        match *self {
            ProgressEvent::StageStarted { index, .. } | ProgressEvent::CaseFinished { index, .. } => {
                index
            }
        }
    }
}

/// Observer of progress events, shared by all concurrently running cases
pub trait ProgressSink: Send + Sync {
    /// Receive one event.
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Logs events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { index, stage } => {
                info!(case = index, "{}", stage.progress_label());
            }
            ProgressEvent::CaseFinished { index, passed } => {
                info!(case = index, passed, "case finished");
            }
        }
    }
}

/// Forwards events over a channel. A dropped receiver is ignored.
impl ProgressSink for Sender<ProgressEvent> {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Keeps every event in arrival order
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<ProgressEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events for one case, in arrival order
    pub fn events_for(&self, index: usize) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.index() == index)
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_events() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.emit(ProgressEvent::StageStarted {
            index: 4,
            stage: Stage::Generation,
        });
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].index(), 4);
    }

    #[test]
    fn test_channel_sink_ignores_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel();
        drop(rx);
        tx.emit(ProgressEvent::CaseFinished {
            index: 0,
            passed: true,
        });
    }

    #[test]
    fn test_recording_filters_by_case() {
        let sink = RecordingProgress::new();
        sink.emit(ProgressEvent::CaseFinished {
            index: 0,
            passed: true,
        });
        sink.emit(ProgressEvent::CaseFinished {
            index: 1,
            passed: false,
        });

        assert_eq!(sink.events().len(), 2);
        assert_eq!(
            sink.events_for(1),
            vec![ProgressEvent::CaseFinished {
                index: 1,
                passed: false
            }]
        );
    }
}
