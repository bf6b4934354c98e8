use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::GameStateEntity;

/// Result of one on-demand sync pass, echoing the applied fields.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    /// Game identifier.
    pub game_id: Uuid,
    /// Home team score after the pass.
    pub home_score: u32,
    /// Away team score after the pass.
    pub away_score: u32,
    /// Current period after the pass.
    pub current_quarter: u32,
    /// Lock flag after the pass.
    pub is_locked: bool,
    /// Final flag after the pass.
    pub is_final: bool,
    /// Whether this pass actually wrote anything.
    pub changed: bool,
}

impl SyncResponse {
    /// Build a response from the post-sync state row.
    pub fn from_state(state: GameStateEntity, changed: bool) -> Self {
        Self {
            game_id: state.game_id,
            home_score: state.home_score,
            away_score: state.away_score,
            current_quarter: state.current_quarter,
            is_locked: state.is_locked,
            is_final: state.is_final,
            changed,
        }
    }
}
