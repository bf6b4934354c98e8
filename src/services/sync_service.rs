//! One score-sync pass for one game.
//!
//! The periodic poller and the on-demand `POST /games/{id}/sync` endpoint
//! share this path so both produce the same writes, broadcasts, and winner
//! resolution. A pass never writes an unchanged field, so any number of
//! concurrent passes over the same reading converge on the same row.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameEntity, GameStateEntity},
    },
    error::ServiceError,
    services::{sse_events, winner_service},
    state::{SharedState, live, live::LiveScore},
};

/// What a sync pass did for one game.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Post-sync state row.
    pub state: GameStateEntity,
    /// Whether anything was written.
    pub changed: bool,
}

/// Apply one upstream reading to a game's stored state.
///
/// Reads (or creates) the state row, diffs it against `live`, writes the
/// partial patch when non-empty, broadcasts the updated row, and resolves
/// quarter winners for any quarter the reading settled.
pub async fn sync_game(
    app: &SharedState,
    store: &Arc<dyn GameStore>,
    game: &GameEntity,
    live: &LiveScore,
) -> Result<SyncOutcome, ServiceError> {
    let current = match store.find_state(game.id).await? {
        Some(row) => row,
        None => {
            let row = store.create_default_state(game.id).await?;
            sse_events::broadcast_state_created(app, row.clone());
            row
        }
    };

    let patch = live::build_sync_patch(&current, live);
    if patch.is_empty() {
        debug!(game_id = %game.id, "scores unchanged, skipping write");
        return Ok(SyncOutcome {
            state: current,
            changed: false,
        });
    }

    let prior_quarter = current.current_quarter;
    let was_final = current.is_final;

    let updated = store.patch_state(game.id, patch).await?;
    info!(
        game_id = %game.id,
        home = updated.home_score,
        away = updated.away_score,
        quarter = updated.current_quarter,
        locked = updated.is_locked,
        "game state updated"
    );
    sse_events::broadcast_state_updated(app, updated.clone());

    // A quarter that just ended settles at the scores the new quarter opens
    // with; the final whistle settles whatever quarter the game ended in.
    if updated.current_quarter > prior_quarter && prior_quarter >= 1 {
        winner_service::resolve_quarter(app, store, &updated, prior_quarter).await?;
    }
    if updated.is_final && !was_final {
        let quarter = updated.current_quarter.max(1);
        winner_service::resolve_quarter(app, store, &updated, quarter).await?;
    }

    Ok(SyncOutcome {
        state: updated,
        changed: true,
    })
}

/// On-demand sync for one game, as driven by the HTTP endpoint.
///
/// A game with no upstream event attached syncs trivially: the stored state
/// is returned untouched with `changed = false`.
pub async fn sync_game_by_id(
    app: &SharedState,
    game_id: Uuid,
) -> Result<SyncOutcome, ServiceError> {
    let store = app.require_game_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game {game_id}")))?;

    let Some(event_id) = game.event_id.as_deref() else {
        let state = match store.find_state(game.id).await? {
            Some(row) => row,
            None => store.create_default_state(game.id).await?,
        };
        return Ok(SyncOutcome {
            state,
            changed: false,
        });
    };

    let scoreboard = app.score_source().fetch_scoreboard().await?;
    let Some(live) = scoreboard.live_score(event_id) else {
        return Err(ServiceError::InvalidState(format!(
            "event {event_id} is not on the scoreboard"
        )));
    };

    sync_game(app, &store, &game, &live).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            game_store::memory::MemoryGameStore,
            models::{SquareEntity, SquareStatus},
        },
        services::score_source::{ScoreSource, ScoreSourceResult, Scoreboard},
        state::AppState,
    };
    use futures::future::BoxFuture;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct NoScoreSource;

    impl ScoreSource for NoScoreSource {
        fn fetch_scoreboard(&self) -> BoxFuture<'static, ScoreSourceResult<Scoreboard>> {
            Box::pin(async { Ok(Scoreboard { events: Vec::new() }) })
        }
    }

    fn app_with_store() -> (SharedState, Arc<dyn GameStore>) {
        let app = AppState::new(AppConfig::default(), Arc::new(NoScoreSource));
        let store: Arc<dyn GameStore> = Arc::new(MemoryGameStore::new());
        (app, store)
    }

    fn game() -> GameEntity {
        GameEntity {
            id: Uuid::new_v4(),
            name: "Super Bowl LX".to_string(),
            event_id: Some("401671889".to_string()),
            game_date: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn live(home: u32, away: u32, period: u32, detail: &str) -> LiveScore {
        LiveScore {
            home_score: home,
            away_score: away,
            period,
            status_detail: detail.to_string(),
        }
    }

    async fn seed_full_grid(store: &Arc<dyn GameStore>, game_id: Uuid) {
        let mut squares = Vec::new();
        for x in 0..10 {
            for y in 0..10 {
                squares.push(SquareEntity {
                    id: Uuid::new_v4(),
                    game_id,
                    user_id: None,
                    x,
                    y,
                    status: SquareStatus::Available,
                });
            }
        }
        store.insert_squares(squares).await.unwrap();
    }

    #[tokio::test]
    async fn unchanged_reading_writes_nothing() {
        let (app, store) = app_with_store();
        let game = game();
        store.create_game(game.clone()).await.unwrap();
        store.create_default_state(game.id).await.unwrap();

        let outcome = sync_game(&app, &store, &game, &live(0, 0, 0, "Sun, February 8th"))
            .await
            .unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.state, GameStateEntity::initial(game.id));
    }

    #[tokio::test]
    async fn first_live_reading_locks_and_shuffles() {
        let (app, store) = app_with_store();
        let game = game();
        store.create_game(game.clone()).await.unwrap();

        let outcome = sync_game(&app, &store, &game, &live(7, 0, 1, "In Progress"))
            .await
            .unwrap();

        assert!(outcome.changed);
        assert!(outcome.state.is_locked);
        assert!(!outcome.state.is_final);
        assert!(live::is_digit_permutation(
            &outcome.state.home_shuffled_scores
        ));
        assert!(live::is_digit_permutation(
            &outcome.state.away_shuffled_scores
        ));
    }

    #[tokio::test]
    async fn quarter_advance_settles_the_prior_quarter() {
        let (app, store) = app_with_store();
        let game = game();
        store.create_game(game.clone()).await.unwrap();
        seed_full_grid(&store, game.id).await;

        sync_game(&app, &store, &game, &live(14, 14, 2, "In Progress"))
            .await
            .unwrap();
        sync_game(&app, &store, &game, &live(21, 14, 3, "In Progress"))
            .await
            .unwrap();

        let winners = store.list_winners(game.id).await.unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].quarter, 2);
        assert_eq!(winners[0].home_score, 21);
        assert_eq!(winners[0].away_score, 14);
    }

    #[tokio::test]
    async fn final_reading_settles_the_last_quarter_once() {
        let (app, store) = app_with_store();
        let game = game();
        store.create_game(game.clone()).await.unwrap();
        seed_full_grid(&store, game.id).await;

        sync_game(&app, &store, &game, &live(28, 24, 4, "In Progress"))
            .await
            .unwrap();
        sync_game(&app, &store, &game, &live(31, 24, 4, "Final"))
            .await
            .unwrap();
        // Convergent: a second final reading changes nothing.
        let again = sync_game(&app, &store, &game, &live(31, 24, 4, "Final"))
            .await
            .unwrap();

        assert!(!again.changed);
        let winners = store.list_winners(game.id).await.unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].quarter, 4);
        assert_eq!(winners[0].home_score, 31);
    }

    #[tokio::test]
    async fn concurrent_passes_over_one_reading_converge() {
        let (app, store) = app_with_store();
        let game = game();
        store.create_game(game.clone()).await.unwrap();
        seed_full_grid(&store, game.id).await;

        let reading = live(17, 10, 2, "In Progress");
        let (first, second) = tokio::join!(
            sync_game(&app, &store, &game, &reading),
            sync_game(&app, &store, &game, &reading),
        );
        first.unwrap();
        second.unwrap();

        let row = store.find_state(game.id).await.unwrap().unwrap();
        assert_eq!(row.home_score, 17);
        assert_eq!(row.away_score, 10);
        assert_eq!(row.current_quarter, 2);
        assert!(row.is_locked);
        assert!(live::is_digit_permutation(&row.home_shuffled_scores));
        assert!(live::is_digit_permutation(&row.away_shuffled_scores));
    }

    #[tokio::test]
    async fn sync_by_id_without_event_is_a_no_op() {
        let (app, store) = app_with_store();
        app.set_game_store(Arc::clone(&store)).await;

        let mut detached = game();
        detached.event_id = None;
        store.create_game(detached.clone()).await.unwrap();

        let outcome = sync_game_by_id(&app, detached.id).await.unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.state.game_id, detached.id);
    }

    #[tokio::test]
    async fn sync_by_id_unknown_game_is_not_found() {
        let (app, store) = app_with_store();
        app.set_game_store(store).await;

        let err = sync_game_by_id(&app, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
