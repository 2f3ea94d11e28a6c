//! Batch document intake: queue, pipeline runner, progress, and report.

mod error;
pub mod job;
pub mod progress;
pub mod report;
mod runner;

pub use error::IntakeError;
pub use job::{BatchJob, BatchProgress, BatchStatus};
pub use progress::{BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use report::{
    BatchReport, FailureStage, FileFailure, ReportAccumulator, ReportEntry, LOCAL_ID_PREFIX,
};
pub use runner::IntakePipeline;
