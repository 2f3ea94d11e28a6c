//! Server-sent event bridge for batch progress.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream};
use invoicewatch::broadcast::BatchProgressEvent;
use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

use crate::state::AppState;

/// SSE event name for batch progress.
pub const BATCH_PROGRESS: &str = "batch-progress";

/// `GET /api/batches/events`
pub async fn batch_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(progress_stream(state.progress.subscribe())).keep_alive(KeepAlive::default())
}

/// Turns a broadcast receiver into an SSE stream. Lagging subscribers skip
/// what they missed; the stream ends when the broadcaster is dropped.
fn progress_stream(rx: Receiver<BatchProgressEvent>) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event(BATCH_PROGRESS).json_data(&event) {
                    Ok(sse) => return Some((Ok(sse), rx)),
                    Err(e) => debug!("Failed to encode progress event: {}", e),
                },
                Err(RecvError::Lagged(n)) => {
                    warn!("Progress stream lagged, missed {} events", n);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use invoicewatch::broadcast::{BatchPhase, BatchProgressBroadcaster};

    #[tokio::test]
    async fn test_stream_yields_broadcast_events() {
        let broadcaster = BatchProgressBroadcaster::new(8);
        let stream = progress_stream(broadcaster.subscribe());
        tokio::pin!(stream);

        broadcaster.send(BatchProgressEvent::new("b1", BatchPhase::Started, 2, "Batch started"));
        assert!(stream.next().await.is_some());
    }

    #[tokio::test]
    async fn test_stream_ends_when_broadcaster_dropped() {
        let broadcaster = BatchProgressBroadcaster::new(8);
        let stream = progress_stream(broadcaster.subscribe());
        drop(broadcaster);
        tokio::pin!(stream);
        assert!(stream.next().await.is_none());
    }
}
