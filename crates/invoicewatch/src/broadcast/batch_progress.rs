//! Batch progress broadcaster for streaming intake status to clients.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::extraction::RiskLevel;
use crate::intake::FailureStage;

/// Step of a batch run an event describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    Started,
    Analyzing,
    Saving,
    FileCompleted,
    FileFailed,
    Finished,
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchPhase::Started => write!(f, "Started"),
            BatchPhase::Analyzing => write!(f, "Analyzing"),
            BatchPhase::Saving => write!(f, "Saving"),
            BatchPhase::FileCompleted => write!(f, "File completed"),
            BatchPhase::FileFailed => write!(f, "File failed"),
            BatchPhase::Finished => write!(f, "Finished"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgressEvent {
    pub batch_id: String,
    pub phase: BatchPhase,
    /// 1-based position of the file in the selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Record id, or a `local-` placeholder when saving failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<FailureStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchProgressEvent {
    pub fn new(batch_id: &str, phase: BatchPhase, total: usize, message: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            phase,
            index: None,
            total,
            file_name: None,
            message: message.into(),
            timestamp: Utc::now(),
            entry_id: None,
            persisted: None,
            risk_level: None,
            stage: None,
            error: None,
        }
    }

    pub fn for_file(mut self, index: usize, file_name: &str) -> Self {
        self.index = Some(index);
        self.file_name = Some(file_name.to_string());
        self
    }
}

/// Fans batch progress events out to any number of subscribers.
#[derive(Clone)]
pub struct BatchProgressBroadcaster {
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl BatchProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: BatchProgressEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BatchProgressEvent> {
        self.sender.subscribe()
    }

    /// Creates a tracker for one batch run.
    pub fn start_batch(&self, batch_id: &str, total: usize) -> BatchProgressTracker {
        BatchProgressTracker {
            batch_id: batch_id.to_string(),
            total,
            sender: Arc::clone(&self.sender),
        }
    }
}

impl Default for BatchProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Emits events for a single batch.
pub struct BatchProgressTracker {
    batch_id: String,
    total: usize,
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl BatchProgressTracker {
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    fn emit(&self, event: BatchProgressEvent) {
        let _ = self.sender.send(event);
    }

    fn event(&self, phase: BatchPhase, message: impl Into<String>) -> BatchProgressEvent {
        BatchProgressEvent::new(&self.batch_id, phase, self.total, message)
    }

    pub fn started(&self) {
        self.emit(self.event(
            BatchPhase::Started,
            format!("Processing {} files", self.total),
        ));
    }

    pub fn analyzing(&self, index: usize, file_name: &str) {
        self.emit(
            self.event(
                BatchPhase::Analyzing,
                format!("Analyzing file {} of {}", index, self.total),
            )
            .for_file(index, file_name),
        );
    }

    pub fn saving(&self, index: usize, file_name: &str) {
        self.emit(
            self.event(BatchPhase::Saving, "Saving record")
                .for_file(index, file_name),
        );
    }

    pub fn file_completed(
        &self,
        index: usize,
        file_name: &str,
        entry_id: &str,
        persisted: bool,
        risk_level: RiskLevel,
    ) {
        let mut event = self
            .event(BatchPhase::FileCompleted, "File analyzed")
            .for_file(index, file_name);
        event.entry_id = Some(entry_id.to_string());
        event.persisted = Some(persisted);
        event.risk_level = Some(risk_level);
        self.emit(event);
    }

    pub fn file_failed(&self, index: usize, file_name: &str, stage: FailureStage, error: &str) {
        let mut event = self
            .event(BatchPhase::FileFailed, format!("File failed during {}", stage))
            .for_file(index, file_name);
        event.stage = Some(stage);
        event.error = Some(error.to_string());
        self.emit(event);
    }

    pub fn finished(&self, analyzed: usize, failed: usize) {
        self.emit(self.event(
            BatchPhase::Finished,
            format!("{} analyzed, {} failed", analyzed, failed),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_subscribers_is_ignored() {
        let broadcaster = BatchProgressBroadcaster::default();
        broadcaster.send(BatchProgressEvent::new("b", BatchPhase::Started, 1, "go"));
    }

    #[test]
    fn test_tracker_sequence() {
        let broadcaster = BatchProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();
        let tracker = broadcaster.start_batch("batch-1", 2);

        tracker.started();
        tracker.analyzing(1, "a.pdf");
        tracker.file_completed(1, "a.pdf", "rec-1", true, RiskLevel::High);
        tracker.file_failed(2, "b.pdf", FailureStage::Analyze, "timeout");
        tracker.finished(1, 1);

        let started = rx.try_recv().unwrap();
        assert_eq!(started.phase, BatchPhase::Started);
        assert_eq!(started.total, 2);
        assert_eq!(started.index, None);

        let analyzing = rx.try_recv().unwrap();
        assert_eq!(analyzing.index, Some(1));
        assert_eq!(analyzing.message, "Analyzing file 1 of 2");

        let completed = rx.try_recv().unwrap();
        assert_eq!(completed.entry_id.as_deref(), Some("rec-1"));
        assert_eq!(completed.risk_level, Some(RiskLevel::High));

        let failed = rx.try_recv().unwrap();
        assert_eq!(failed.stage, Some(FailureStage::Analyze));
        assert_eq!(failed.error.as_deref(), Some("timeout"));

        let finished = rx.try_recv().unwrap();
        assert_eq!(finished.phase, BatchPhase::Finished);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_json_shape() {
        let event = BatchProgressEvent::new("b", BatchPhase::FileCompleted, 3, "ok")
            .for_file(2, "x.png");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["batchId"], "b");
        assert_eq!(json["phase"], "file_completed");
        assert_eq!(json["index"], 2);
        assert_eq!(json["fileName"], "x.png");
        assert!(json.get("error").is_none());
    }
}
