use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Squares Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::event_stream,
        crate::routes::game::list_games,
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::game::get_state,
        crate::routes::game::lock_game,
        crate::routes::game::list_winners,
        crate::routes::game::sync_game,
        crate::routes::squares::list_squares,
        crate::routes::squares::claim_square,
        crate::routes::squares::pay_square,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameSummary,
            crate::dto::game::GameStateView,
            crate::dto::game::QuarterWinnerView,
            crate::dto::squares::ClaimSquareRequest,
            crate::dto::squares::PaySquareRequest,
            crate::dto::squares::SquareView,
            crate::dto::sync::SyncResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game registration, live state, and score sync"),
        (name = "squares", description = "Grid square claiming and payment"),
        (name = "sse", description = "Server-sent events change feed"),
    )
)]
pub struct ApiDoc;
