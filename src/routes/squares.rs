use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::squares::{ClaimSquareRequest, PaySquareRequest, SquareView},
    error::AppError,
    services::squares_service,
    state::SharedState,
};

/// Grid endpoints: listing, claiming, and paying squares.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games/{id}/squares", get(list_squares))
        .route("/games/{id}/squares/claim", post(claim_square))
        .route("/games/{id}/squares/pay", post(pay_square))
}

/// List the 10x10 grid of a game, row-major.
#[utoipa::path(
    get,
    path = "/games/{id}/squares",
    tag = "squares",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Grid squares", body = [SquareView]),
        (status = 404, description = "Unknown game"),
    )
)]
pub async fn list_squares(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SquareView>>, AppError> {
    let squares = squares_service::list_squares(&state, id).await?;
    Ok(Json(squares.into_iter().map(Into::into).collect()))
}

/// Claim an available square.
#[utoipa::path(
    post,
    path = "/games/{id}/squares/claim",
    tag = "squares",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = ClaimSquareRequest,
    responses(
        (status = 200, description = "Square claimed", body = SquareView),
        (status = 404, description = "Unknown game or square"),
        (status = 409, description = "Square already claimed or grid locked"),
    )
)]
pub async fn claim_square(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClaimSquareRequest>,
) -> Result<Json<SquareView>, AppError> {
    request.validate()?;
    let square = squares_service::claim_square(&state, id, request).await?;
    Ok(Json(square.into()))
}

/// Mark a claimed square as paid.
#[utoipa::path(
    post,
    path = "/games/{id}/squares/pay",
    tag = "squares",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = PaySquareRequest,
    responses(
        (status = 200, description = "Square paid", body = SquareView),
        (status = 404, description = "Unknown game or square"),
        (status = 409, description = "Square has not been claimed"),
    )
)]
pub async fn pay_square(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PaySquareRequest>,
) -> Result<Json<SquareView>, AppError> {
    request.validate()?;
    let square = squares_service::pay_square(&state, id, request).await?;
    Ok(Json(square.into()))
}
