use crate::broadcast::batch_progress::{BatchProgressBroadcaster, BatchProgressTracker};
use crate::extraction::RiskLevel;

use super::report::FailureStage;

/// Events emitted by the intake pipeline while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    Analyzing {
        index: usize,
        file_name: String,
    },
    Saving {
        index: usize,
        file_name: String,
    },
    FileCompleted {
        index: usize,
        file_name: String,
        entry_id: String,
        persisted: bool,
        risk_level: RiskLevel,
    },
    FileFailed {
        index: usize,
        file_name: String,
        stage: FailureStage,
        error: String,
    },
    Finished {
        analyzed: usize,
        failed: usize,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Reporter that drops every event.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Bridges pipeline events to a [`BatchProgressBroadcaster`].
pub struct BroadcastProgress {
    tracker: BatchProgressTracker,
}

impl BroadcastProgress {
    pub fn new(broadcaster: &BatchProgressBroadcaster, batch_id: &str, total: usize) -> Self {
        Self {
            tracker: broadcaster.start_batch(batch_id, total),
        }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { .. } => self.tracker.started(),
            ProgressEvent::Analyzing { index, file_name } => {
                self.tracker.analyzing(index, &file_name)
            }
            ProgressEvent::Saving { index, file_name } => self.tracker.saving(index, &file_name),
            ProgressEvent::FileCompleted {
                index,
                file_name,
                entry_id,
                persisted,
                risk_level,
            } => self
                .tracker
                .file_completed(index, &file_name, &entry_id, persisted, risk_level),
            ProgressEvent::FileFailed {
                index,
                file_name,
                stage,
                error,
            } => self.tracker.file_failed(index, &file_name, stage, &error),
            ProgressEvent::Finished { analyzed, failed } => self.tracker.finished(analyzed, failed),
        }
    }
}
