//! Game lifecycle: registration, lookup, and read models.

use uuid::Uuid;

use crate::{
    dao::models::{
        GRID_SIZE, GameEntity, GameSettingsEntity, GameStateEntity, GameStatePatch,
        QuarterWinnerEntity, SquareEntity, SquareStatus,
    },
    dto::game::{CreateGameRequest, GameSummary},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, live},
};

/// Register a new game: the game row, its settings, an empty 10x10 grid of
/// squares, and the initial state row, in that order.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;

    let game = GameEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        event_id: request.event_id,
        game_date: request.game_date,
    };
    let settings = GameSettingsEntity {
        game_id: game.id,
        cost_per_square: request
            .cost_per_square
            .unwrap_or(GameSettingsEntity::DEFAULT_COST),
    };

    store.create_game(game.clone()).await?;
    store.save_settings(settings.clone()).await?;
    store.insert_squares(empty_grid(game.id)).await?;
    let initial = store.create_default_state(game.id).await?;

    let summary = GameSummary::from_parts(game, Some(settings));
    tracing::info!(game_id = %summary.id, name = %summary.name, "game created");
    sse_events::broadcast_state_created(state, initial);
    sse_events::broadcast_game_created(state, summary.clone());
    Ok(summary)
}

/// All registered games, each joined with its settings row.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_game_store().await?;
    let games = store.list_games().await?;

    let mut summaries = Vec::with_capacity(games.len());
    for game in games {
        let settings = store.find_settings(game.id).await?;
        summaries.push(GameSummary::from_parts(game, settings));
    }
    Ok(summaries)
}

/// One game by id.
pub async fn get_game(state: &SharedState, game_id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_game_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game {game_id}")))?;
    let settings = store.find_settings(game_id).await?;
    Ok(GameSummary::from_parts(game, settings))
}

/// Live state row for a game, creating the initial row on first read so
/// clients never see a 404 for a registered game.
pub async fn get_state(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameStateEntity, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game {game_id}")));
    }
    match store.find_state(game_id).await? {
        Some(row) => Ok(row),
        None => {
            let row = store.create_default_state(game_id).await?;
            sse_events::broadcast_state_created(state, row.clone());
            Ok(row)
        }
    }
}

/// Lock a game's grid ahead of kickoff, fixing the digit shuffles.
///
/// Locking is one-way; a grid the poller already locked cannot be locked
/// again.
pub async fn lock_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameStateEntity, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game {game_id}")));
    }

    let current = match store.find_state(game_id).await? {
        Some(row) => row,
        None => store.create_default_state(game_id).await?,
    };
    if current.is_locked {
        return Err(ServiceError::InvalidState(
            "the grid is already locked".into(),
        ));
    }

    let mut patch = GameStatePatch {
        is_locked: Some(true),
        ..Default::default()
    };
    if current.home_shuffled_scores.is_empty() {
        patch.home_shuffled_scores = Some(live::shuffled_digits());
    }
    if current.away_shuffled_scores.is_empty() {
        patch.away_shuffled_scores = Some(live::shuffled_digits());
    }

    let updated = store.patch_state(game_id, patch).await?;
    tracing::info!(game_id = %game_id, "grid locked");
    sse_events::broadcast_state_updated(state, updated.clone());
    Ok(updated)
}

/// Recorded quarter winners for a game, ordered by quarter.
pub async fn list_winners(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<QuarterWinnerEntity>, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game {game_id}")));
    }
    Ok(store.list_winners(game_id).await?)
}

fn empty_grid(game_id: Uuid) -> Vec<SquareEntity> {
    let mut squares = Vec::with_capacity((GRID_SIZE as usize).pow(2));
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
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
    squares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::{GameStore, memory::MemoryGameStore},
        services::score_source::{ScoreSource, ScoreSourceResult, Scoreboard},
        state::AppState,
    };
    use futures::future::BoxFuture;
    use std::sync::Arc;
    use time::macros::datetime;

    struct NoScoreSource;

    impl ScoreSource for NoScoreSource {
        fn fetch_scoreboard(&self) -> BoxFuture<'static, ScoreSourceResult<Scoreboard>> {
            Box::pin(async { Ok(Scoreboard { events: Vec::new() }) })
        }
    }

    async fn app() -> SharedState {
        let app = AppState::new(AppConfig::default(), Arc::new(NoScoreSource));
        app.set_game_store(Arc::new(MemoryGameStore::new())).await;
        app
    }

    fn request() -> CreateGameRequest {
        CreateGameRequest {
            name: "Super Bowl LX".into(),
            event_id: Some("401671889".into()),
            game_date: datetime!(2026-02-08 18:30 UTC),
            cost_per_square: Some(25),
        }
    }

    #[tokio::test]
    async fn create_game_seeds_grid_settings_and_state() {
        let app = app().await;
        let summary = create_game(&app, request()).await.unwrap();
        assert_eq!(summary.cost_per_square, 25);

        let store = app.require_game_store().await.unwrap();
        let squares = store.list_squares(summary.id).await.unwrap();
        assert_eq!(squares.len(), 100);
        assert!(
            squares
                .iter()
                .all(|s| s.status == SquareStatus::Available && s.user_id.is_none())
        );

        let state = store.find_state(summary.id).await.unwrap().unwrap();
        assert_eq!(state, GameStateEntity::initial(summary.id));
    }

    #[tokio::test]
    async fn get_state_creates_the_row_on_first_read() {
        let app = app().await;
        let store = app.require_game_store().await.unwrap();

        let game = GameEntity {
            id: Uuid::new_v4(),
            name: "manual".into(),
            event_id: None,
            game_date: datetime!(2026-02-08 18:30 UTC),
        };
        store.create_game(game.clone()).await.unwrap();

        let row = get_state(&app, game.id).await.unwrap();
        assert_eq!(row, GameStateEntity::initial(game.id));
    }

    #[tokio::test]
    async fn lookups_for_unknown_games_are_not_found() {
        let app = app().await;
        let missing = Uuid::new_v4();
        assert!(matches!(
            get_game(&app, missing).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            get_state(&app, missing).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            list_winners(&app, missing).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn lock_game_is_one_way_and_fixes_shuffles() {
        let app = app().await;
        let summary = create_game(&app, request()).await.unwrap();

        let locked = lock_game(&app, summary.id).await.unwrap();
        assert!(locked.is_locked);
        assert!(crate::state::live::is_digit_permutation(
            &locked.home_shuffled_scores
        ));
        assert!(crate::state::live::is_digit_permutation(
            &locked.away_shuffled_scores
        ));

        let err = lock_game(&app, summary.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn missing_settings_fall_back_to_default_cost() {
        let app = app().await;
        let store = app.require_game_store().await.unwrap();

        let game = GameEntity {
            id: Uuid::new_v4(),
            name: "no settings".into(),
            event_id: None,
            game_date: datetime!(2026-02-08 18:30 UTC),
        };
        store.create_game(game.clone()).await.unwrap();

        let summary = get_game(&app, game.id).await.unwrap();
        assert_eq!(summary.cost_per_square, GameSettingsEntity::DEFAULT_COST);
    }
}
