//! Typed change-feed broadcasts.
//!
//! Every write to the store goes through one of these helpers so SSE
//! subscribers receive a tagged, schema'd event instead of a raw row.

use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::{GameStateEntity, QuarterWinnerEntity, SquareEntity},
    dto::{
        game::GameSummary,
        sse::{
            GameCreatedEvent, ServerEvent, SquareUpdatedEvent, StateCreatedEvent,
            StateUpdatedEvent, SystemStatus, WinnerDeclaredEvent,
        },
    },
    state::SharedState,
};

const EVENT_GAME_CREATED: &str = "game.created";
const EVENT_STATE_CREATED: &str = "state.created";
const EVENT_STATE_UPDATED: &str = "state.updated";
const EVENT_SQUARE_UPDATED: &str = "square.updated";
const EVENT_WINNER_DECLARED: &str = "winner.declared";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a newly registered game.
pub fn broadcast_game_created(state: &SharedState, game: GameSummary) {
    let payload = GameCreatedEvent { game };
    send_event(state, EVENT_GAME_CREATED, &payload);
}

/// Broadcast the creation of a game's state row.
pub fn broadcast_state_created(state: &SharedState, row: GameStateEntity) {
    let payload = StateCreatedEvent(row.into());
    send_event(state, EVENT_STATE_CREATED, &payload);
}

/// Broadcast the full post-update state row after a successful patch.
pub fn broadcast_state_updated(state: &SharedState, row: GameStateEntity) {
    let payload = StateUpdatedEvent(row.into());
    send_event(state, EVENT_STATE_UPDATED, &payload);
}

/// Broadcast a claimed or paid square.
pub fn broadcast_square_updated(state: &SharedState, square: SquareEntity) {
    let payload = SquareUpdatedEvent {
        square: square.into(),
    };
    send_event(state, EVENT_SQUARE_UPDATED, &payload);
}

/// Broadcast a freshly recorded quarter winner.
pub fn broadcast_winner_declared(state: &SharedState, winner: QuarterWinnerEntity) {
    let payload = WinnerDeclaredEvent {
        game_id: winner.game_id,
        winner: winner.into(),
    };
    send_event(state, EVENT_WINNER_DECLARED, &payload);
}

/// Broadcast a degraded-mode transition.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    send_event(state, EVENT_SYSTEM_STATUS, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
