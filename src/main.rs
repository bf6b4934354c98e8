//! Squares Back binary entrypoint wiring REST, SSE, the score poller, and storage.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squares_back::{
    config::AppConfig,
    dao::{
        game_store::{
            GameStore,
            memory::MemoryGameStore,
            postgrest::{PostgrestConfig, PostgrestGameStore},
        },
        storage::StorageError,
    },
    routes,
    services::{poller, score_source::HttpScoreSource, sse_events, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let score_source = HttpScoreSource::new(config.scoreboard_url.clone(), config.request_timeout)
        .context("building scoreboard client")?;

    let app_state = AppState::new(config, Arc::new(score_source));

    tokio::spawn(storage_supervisor::run(app_state.clone(), connect_store));
    tokio::spawn(watch_degraded(app_state.clone()));

    let shutdown = poller::shutdown_handle();
    let poller_handle =
        poller::ScorePoller::new(app_state.clone(), Arc::clone(&shutdown)).spawn();

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    // notify_one keeps a permit, so the signal survives even if the poller
    // is mid-pass and not parked on the handle yet.
    shutdown.notify_one();
    let _ = poller_handle.await;

    Ok(())
}

/// Connect the configured storage backend: PostgREST when credentials are in
/// the environment, an in-memory store otherwise so local development works
/// without a database.
async fn connect_store() -> Result<Arc<dyn GameStore>, StorageError> {
    if PostgrestConfig::env_configured() {
        let config = PostgrestConfig::from_env().map_err(StorageError::from)?;
        let store = PostgrestGameStore::connect(config)
            .await
            .map_err(StorageError::from)?;
        Ok(Arc::new(store))
    } else {
        info!("no PostgREST credentials configured; using in-memory store");
        Ok(Arc::new(MemoryGameStore::new()))
    }
}

/// Relay degraded-mode transitions to SSE subscribers.
async fn watch_degraded(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        sse_events::broadcast_system_status(&state, degraded);
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
