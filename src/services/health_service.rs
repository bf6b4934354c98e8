use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Build the health payload, pinging the store so connectivity problems
/// show up in the logs before the supervisor notices them.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if let Ok(store) = state.require_game_store().await {
        if let Err(err) = store.health_check().await {
            warn!(error = %err, "storage health check failed");
        }
    } else {
        warn!("storage unavailable (degraded mode)");
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
