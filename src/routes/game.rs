use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        game::{CreateGameRequest, GameStateView, GameSummary, QuarterWinnerView},
        sync::SyncResponse,
    },
    error::AppError,
    services::{game_service, sync_service},
    state::SharedState,
};

/// Game registration, live state, winners, and on-demand sync.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/state", get(get_state))
        .route("/games/{id}/lock", post(lock_game))
        .route("/games/{id}/winners", get(list_winners))
        .route("/games/{id}/sync", post(sync_game))
}

/// List every registered game with its settings.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "List registered games", body = [GameSummary]))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Register a new game with an empty grid.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameSummary),
        (status = 400, description = "Invalid payload"),
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameSummary>), AppError> {
    request.validate()?;
    let summary = game_service::create_game(&state, request).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Retrieve a game by its identifier.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game", body = GameSummary),
        (status = 404, description = "Unknown game"),
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Retrieve the live state of a game.
#[utoipa::path(
    get,
    path = "/games/{id}/state",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Live game state", body = GameStateView),
        (status = 404, description = "Unknown game"),
    )
)]
pub async fn get_state(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateView>, AppError> {
    let row = game_service::get_state(&state, id).await?;
    Ok(Json(row.into()))
}

/// Lock the grid ahead of kickoff, fixing the digit shuffles.
#[utoipa::path(
    post,
    path = "/games/{id}/lock",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Grid locked", body = GameStateView),
        (status = 404, description = "Unknown game"),
        (status = 409, description = "Grid already locked"),
    )
)]
pub async fn lock_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateView>, AppError> {
    let row = game_service::lock_game(&state, id).await?;
    Ok(Json(row.into()))
}

/// List the recorded quarter winners of a game.
#[utoipa::path(
    get,
    path = "/games/{id}/winners",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Quarter winners ordered by quarter", body = [QuarterWinnerView]),
        (status = 404, description = "Unknown game"),
    )
)]
pub async fn list_winners(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<QuarterWinnerView>>, AppError> {
    let winners = game_service::list_winners(&state, id).await?;
    Ok(Json(winners.into_iter().map(Into::into).collect()))
}

/// Run one sync pass for a game right now instead of waiting for the poller.
/// Other HTTP methods on this path are answered with 405.
#[utoipa::path(
    post,
    path = "/games/{id}/sync",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Sync pass completed", body = SyncResponse),
        (status = 404, description = "Unknown game"),
        (status = 409, description = "The game's event is not on the scoreboard"),
        (status = 502, description = "Scoreboard fetch failed"),
        (status = 503, description = "Storage unavailable"),
    )
)]
pub async fn sync_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SyncResponse>, AppError> {
    let outcome = sync_service::sync_game_by_id(&state, id).await?;
    Ok(Json(SyncResponse::from_state(outcome.state, outcome.changed)))
}
