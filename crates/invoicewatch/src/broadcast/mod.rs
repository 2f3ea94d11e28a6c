//! Broadcasting of intake progress for live clients.

pub mod batch_progress;

pub use batch_progress::{
    BatchPhase, BatchProgressBroadcaster, BatchProgressEvent, BatchProgressTracker,
};
