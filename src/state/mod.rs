//! Shared application state and the pure live-score domain logic.

pub mod live;
mod sse;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::game_store::GameStore, error::ServiceError,
    services::score_source::ScoreSource,
};

pub use self::sse::SseHub;

/// Cheap-to-clone handle to the shared application state.
pub type SharedState = Arc<AppState>;

/// Capacity of the SSE broadcast channel.
const SSE_CAPACITY: usize = 32;

/// Central application state: the installed storage backend, the SSE hub,
/// and the degraded-mode flag.
pub struct AppState {
    config: AppConfig,
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    score_source: Arc<dyn ScoreSource>,
    sse: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, score_source: Arc<dyn ScoreSource>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            game_store: RwLock::new(None),
            score_source,
            sse: SseHub::new(SSE_CAPACITY),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Adapter used to read the upstream scoreboard.
    pub fn score_source(&self) -> &Arc<dyn ScoreSource> {
        &self.score_source
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the game store or fail with a degraded-mode error.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Flip the degraded flag, notifying watchers only on actual changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Broadcast hub for the SSE change feed.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }
}
