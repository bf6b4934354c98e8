use serde::Serialize;
use utoipa::ToSchema;

/// Payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `"ok"` when storage is reachable, `"degraded"` otherwise.
    pub status: &'static str,
    /// Whether the service is currently running without storage.
    pub degraded: bool,
}

impl HealthResponse {
    /// Healthy response: storage reachable, poller writing.
    pub fn ok() -> Self {
        Self {
            status: "ok",
            degraded: false,
        }
    }

    /// Degraded response: reads of live data may be stale, writes fail.
    pub fn degraded() -> Self {
        Self {
            status: "degraded",
            degraded: true,
        }
    }
}
