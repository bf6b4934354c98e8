use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Broadcast hub fanning change events out to every SSE subscriber.
///
/// Delivery is at-least-once and never blocks the writer: a slow subscriber
/// lags and skips, it cannot apply backpressure to the sync path.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Hub backed by a broadcast channel holding up to `capacity` events
    /// per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a subscriber; it receives events sent from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Fan an event out to all current subscribers. Having no subscribers
    /// is not an error.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
