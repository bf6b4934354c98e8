//! Quarter-winner resolution.
//!
//! Maps a settled quarter's score digits onto the locked grid and records
//! the winning square. Re-running for an already-settled quarter is a no-op:
//! the store's `(game, quarter)` uniqueness decides, not the caller.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameStateEntity, QuarterWinnerEntity},
    },
    error::ServiceError,
    services::sse_events,
    state::{SharedState, live},
};

/// Record the winner for `quarter` based on the given state row.
///
/// Returns the recorded winner when this call actually inserted one. Silent
/// outcomes: grid not locked yet, the winning square was never claimed, or
/// the quarter is already settled.
pub async fn resolve_quarter(
    state: &SharedState,
    store: &Arc<dyn GameStore>,
    row: &GameStateEntity,
    quarter: u32,
) -> Result<Option<QuarterWinnerEntity>, ServiceError> {
    let Some((x, y)) = live::winner_coordinate(
        row.home_score,
        row.away_score,
        &row.home_shuffled_scores,
        &row.away_shuffled_scores,
    ) else {
        return Ok(None);
    };

    let Some(square) = store.find_square(row.game_id, x, y).await? else {
        warn!(
            game_id = %row.game_id,
            quarter,
            x,
            y,
            "winning coordinate has no square; grid was never initialized"
        );
        return Ok(None);
    };

    let winner = QuarterWinnerEntity {
        id: Uuid::new_v4(),
        game_id: row.game_id,
        quarter,
        square_id: square.id,
        home_score: row.home_score,
        away_score: row.away_score,
    };

    if !store.insert_winner_if_absent(winner.clone()).await? {
        return Ok(None);
    }

    info!(
        game_id = %row.game_id,
        quarter,
        x,
        y,
        home = row.home_score,
        away = row.away_score,
        "quarter winner recorded"
    );
    sse_events::broadcast_winner_declared(state, winner.clone());
    Ok(Some(winner))
}
