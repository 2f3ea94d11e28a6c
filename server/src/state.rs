//! Shared state handed to every route handler.

use std::sync::Arc;

use invoicewatch::analyzer::DocumentAnalyzer;
use invoicewatch::broadcast::BatchProgressBroadcaster;
use invoicewatch::intake::IntakePipeline;
use invoicewatch::store::{Owner, SqliteRecordStore};
use tokio::sync::Mutex;

pub type Pipeline = IntakePipeline<Arc<dyn DocumentAnalyzer>, SqliteRecordStore>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// Progress events for the batch currently running, if any.
    pub progress: BatchProgressBroadcaster,
    /// Held for the duration of a batch; only one batch runs at a time.
    pub batch_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        analyzer: Arc<dyn DocumentAnalyzer>,
        store: SqliteRecordStore,
        owner: Owner,
        currency: &str,
    ) -> Self {
        Self::from_pipeline(IntakePipeline::new(analyzer, store, owner, currency))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            progress: BatchProgressBroadcaster::default(),
            batch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &SqliteRecordStore {
        self.pipeline.store()
    }

    pub fn owner_id(&self) -> &str {
        &self.pipeline.owner().id
    }
}
