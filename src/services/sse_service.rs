//! Server-Sent Events plumbing: subscription, stream conversion, handshake.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::warn;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::{SharedState, SseHub},
};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Subscribe to the shared SSE change feed.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.sse().subscribe()
}

/// Convert a broadcast receiver into an SSE response.
///
/// A lagged subscriber skips the missed events and keeps streaming; the
/// receiver is dropped when the client disconnects and axum drops the
/// response stream.
pub fn to_sse_stream(
    receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(receiver).filter_map(|received| async move {
        match received {
            Ok(payload) => {
                let mut event = Event::default().data(payload.data);
                if let Some(name) = payload.event {
                    event = event.event(name);
                }
                Some(Ok(event))
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "SSE subscriber lagged, dropping events");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

/// Send the connection handshake onto the feed so the new subscriber learns
/// the current degraded flag.
pub fn broadcast_handshake(hub: &SseHub, degraded: bool) {
    if let Ok(event) = ServerEvent::json(
        Some("handshake".to_string()),
        &Handshake {
            message: "change feed connected".to_string(),
            degraded,
        },
    ) {
        hub.broadcast(event);
    }
}
