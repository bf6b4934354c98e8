//! Grid square operations: claiming and marking paid.

use uuid::Uuid;

use crate::{
    dao::models::{SquareEntity, SquareStatus},
    dto::squares::{ClaimSquareRequest, PaySquareRequest},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// All squares of a game's grid, row-major.
pub async fn list_squares(
    state: &SharedState,
    game_id: Uuid,
) -> Result<Vec<SquareEntity>, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_game(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game {game_id}")));
    }
    Ok(store.list_squares(game_id).await?)
}

/// Claim an available square for a user. Rejected once the grid is locked.
pub async fn claim_square(
    state: &SharedState,
    game_id: Uuid,
    request: ClaimSquareRequest,
) -> Result<SquareEntity, ServiceError> {
    let store = state.require_game_store().await?;

    if let Some(row) = store.find_state(game_id).await?
        && row.is_locked
    {
        return Err(ServiceError::InvalidState(
            "the grid is locked, squares can no longer be claimed".into(),
        ));
    }

    let square = find_square(state, game_id, request.x, request.y).await?;
    if square.status != SquareStatus::Available {
        return Err(ServiceError::InvalidState(format!(
            "square ({}, {}) is already claimed",
            request.x, request.y
        )));
    }

    let claimed = SquareEntity {
        user_id: Some(request.user_id),
        status: SquareStatus::Claimed,
        ..square
    };
    store.update_square(claimed.clone()).await?;
    sse_events::broadcast_square_updated(state, claimed.clone());
    Ok(claimed)
}

/// Mark a claimed square as paid.
pub async fn pay_square(
    state: &SharedState,
    game_id: Uuid,
    request: PaySquareRequest,
) -> Result<SquareEntity, ServiceError> {
    let store = state.require_game_store().await?;

    let square = find_square(state, game_id, request.x, request.y).await?;
    match square.status {
        SquareStatus::Claimed => {}
        SquareStatus::Available => {
            return Err(ServiceError::InvalidState(format!(
                "square ({}, {}) has not been claimed",
                request.x, request.y
            )));
        }
        SquareStatus::Paid => return Ok(square),
    }

    let paid = SquareEntity {
        status: SquareStatus::Paid,
        ..square
    };
    store.update_square(paid.clone()).await?;
    sse_events::broadcast_square_updated(state, paid.clone());
    Ok(paid)
}

async fn find_square(
    state: &SharedState,
    game_id: Uuid,
    x: u8,
    y: u8,
) -> Result<SquareEntity, ServiceError> {
    let store = state.require_game_store().await?;
    store
        .find_square(game_id, x, y)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("square ({x}, {y}) of game {game_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::GameStatePatch,
        },
        dto::game::CreateGameRequest,
        services::{
            game_service,
            score_source::{ScoreSource, ScoreSourceResult, Scoreboard},
        },
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

    async fn app_with_game() -> (SharedState, Uuid) {
        let app = AppState::new(AppConfig::default(), Arc::new(NoScoreSource));
        app.set_game_store(Arc::new(MemoryGameStore::new())).await;
        let summary = game_service::create_game(
            &app,
            CreateGameRequest {
                name: "Super Bowl LX".into(),
                event_id: None,
                game_date: datetime!(2026-02-08 18:30 UTC),
                cost_per_square: None,
            },
        )
        .await
        .unwrap();
        (app, summary.id)
    }

    #[tokio::test]
    async fn claim_then_pay_walks_the_status_lifecycle() {
        let (app, game_id) = app_with_game().await;
        let user_id = Uuid::new_v4();

        let claimed = claim_square(
            &app,
            game_id,
            ClaimSquareRequest {
                x: 3,
                y: 7,
                user_id,
            },
        )
        .await
        .unwrap();
        assert_eq!(claimed.status, SquareStatus::Claimed);
        assert_eq!(claimed.user_id, Some(user_id));

        let paid = pay_square(&app, game_id, PaySquareRequest { x: 3, y: 7 })
            .await
            .unwrap();
        assert_eq!(paid.status, SquareStatus::Paid);
        assert_eq!(paid.user_id, Some(user_id));
    }

    #[tokio::test]
    async fn claiming_a_taken_square_conflicts() {
        let (app, game_id) = app_with_game().await;

        claim_square(
            &app,
            game_id,
            ClaimSquareRequest {
                x: 0,
                y: 0,
                user_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap();

        let err = claim_square(
            &app,
            game_id,
            ClaimSquareRequest {
                x: 0,
                y: 0,
                user_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn claims_are_rejected_once_locked() {
        let (app, game_id) = app_with_game().await;
        let store = app.require_game_store().await.unwrap();
        store
            .patch_state(
                game_id,
                GameStatePatch {
                    is_locked: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = claim_square(
            &app,
            game_id,
            ClaimSquareRequest {
                x: 5,
                y: 5,
                user_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn claiming_out_of_range_coordinates_is_not_found() {
        let (app, game_id) = app_with_game().await;

        let err = claim_square(
            &app,
            game_id,
            ClaimSquareRequest {
                x: 10,
                y: 0,
                user_id: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn paying_an_unclaimed_square_conflicts() {
        let (app, game_id) = app_with_game().await;
        let err = pay_square(&app, game_id, PaySquareRequest { x: 1, y: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
