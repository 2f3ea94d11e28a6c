use serde::Serialize;
use uuid::Uuid;

use crate::analyzer::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Idle,
    Running,
    Done,
}

/// "File i of n", 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub index: usize,
    pub total: usize,
}

impl std::fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file {} of {}", self.index, self.total)
    }
}

/// An ordered selection of documents and a cursor over it.
///
/// Files are handed out strictly in selection order, one at a time. The
/// cursor only moves forward; there is no retry or reordering here.
#[derive(Debug)]
pub struct BatchJob {
    id: String,
    files: Vec<Document>,
    cursor: usize,
    status: BatchStatus,
}

impl BatchJob {
    pub fn new(files: Vec<Document>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            files,
            cursor: 0,
            status: BatchStatus::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Index of the file being processed (0-based). Equals `total()` once done.
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// `None` unless the batch is running.
    pub fn progress(&self) -> Option<BatchProgress> {
        (self.status == BatchStatus::Running).then(|| BatchProgress {
            index: self.cursor + 1,
            total: self.files.len(),
        })
    }

    /// Moves an idle, non-empty job to `Running`. Returns whether it started.
    pub fn start(&mut self) -> bool {
        if self.status != BatchStatus::Idle || self.files.is_empty() {
            return false;
        }
        self.status = BatchStatus::Running;
        true
    }

    /// The file under the cursor while running.
    pub fn current(&self) -> Option<&Document> {
        match self.status {
            BatchStatus::Running => self.files.get(self.cursor),
            _ => None,
        }
    }

    /// Marks the current file finished and moves to the next one.
    pub fn advance(&mut self) {
        if self.status != BatchStatus::Running {
            return;
        }
        self.cursor += 1;
        if self.cursor >= self.files.len() {
            self.status = BatchStatus::Done;
        }
    }

    pub fn files(&self) -> &[Document] {
        &self.files
    }
}
