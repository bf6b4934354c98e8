use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{
    game::{GameStateView, GameSummary, QuarterWinnerView},
    squares::SquareView,
};

/// Dispatched payload carried across the SSE channel.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Pre-rendered JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Build an event with a pre-rendered data field.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Initial metadata sent to an SSE client when it connects.
#[derive(Debug, Serialize, ToSchema)]
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

/// Broadcast when the backend enters or leaves degraded mode.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatus {
    /// Whether the backend is currently without storage.
    pub degraded: bool,
}

/// Broadcast when a new game has been registered.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCreatedEvent {
    /// The newly registered game.
    pub game: GameSummary,
}

/// Broadcast when a game's state row has been created.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StateCreatedEvent(pub GameStateView);

/// Broadcast whenever a game's state row changes (scores, quarter, lock,
/// final, shuffles). Carries the full post-update row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StateUpdatedEvent(pub GameStateView);

/// Broadcast when a square has been claimed or paid.
#[derive(Debug, Serialize, ToSchema)]
pub struct SquareUpdatedEvent {
    /// The square in its post-update state.
    pub square: SquareView,
}

/// Broadcast when a quarter winner has been recorded.
#[derive(Debug, Serialize, ToSchema)]
pub struct WinnerDeclaredEvent {
    /// Game the winner belongs to.
    pub game_id: Uuid,
    /// The recorded winner.
    pub winner: QuarterWinnerView,
}
