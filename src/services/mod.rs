/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle and read models.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Background score poller.
pub mod poller;
/// Upstream scoreboard adapter.
pub mod score_source;
/// Grid square claiming and payment.
pub mod squares_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
/// Shared score-sync pass for the poller and the sync endpoint.
pub mod sync_service;
/// Quarter-winner resolution.
pub mod winner_service;
