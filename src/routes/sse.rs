use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/stream",
    tag = "sse",
    responses((status = 200, description = "Change feed", content_type = "text/event-stream", body = String))
)]
/// Stream realtime game, state, square, and winner events to clients.
pub async fn event_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!("new SSE subscriber");
    sse_service::broadcast_handshake(state.sse(), state.is_degraded());
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/stream", get(event_stream))
}
