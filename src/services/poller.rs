//! Background score poller.
//!
//! Every cycle fetches the scoreboard once, then syncs every game that has
//! an upstream event attached. Upstream failures stretch the pause with a
//! capped exponential backoff; per-game failures are logged and skipped so
//! one broken game never starves the rest.

use std::{sync::Arc, time::Duration};

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::{services::sync_service, state::SharedState};

/// Periodic score-sync driver.
pub struct ScorePoller {
    app: SharedState,
    shutdown: Arc<Notify>,
}

impl ScorePoller {
    /// Build a poller with its shutdown handle.
    pub fn new(app: SharedState, shutdown: Arc<Notify>) -> Self {
        Self { app, shutdown }
    }

    /// Spawn the poll loop onto the runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let base_interval = self.app.config().poll_interval;
        let max_backoff = self.app.config().max_backoff;
        info!(interval_s = base_interval.as_secs(), "score poller started");

        // One waiter registered for the whole loop, so a signal arriving
        // while a pass is in flight is observed instead of dropped.
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);

        let mut delay = base_interval;
        loop {
            let result = tokio::select! {
                _ = &mut shutdown => {
                    info!("score poller stopping");
                    return;
                }
                result = self.poll_once() => result,
            };

            match result {
                PassResult::Ok => delay = base_interval,
                PassResult::UpstreamFailed => {
                    delay = (delay * 2).min(max_backoff).max(base_interval);
                    warn!(
                        retry_in_s = delay.as_secs(),
                        "scoreboard fetch failed, backing off"
                    );
                }
                PassResult::Skipped => delay = base_interval,
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("score poller stopping");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One poll pass over every registered game.
    async fn poll_once(&self) -> PassResult {
        let Some(store) = self.app.game_store().await else {
            debug!("storage degraded, skipping poll cycle");
            return PassResult::Skipped;
        };

        let games = match store.list_games().await {
            Ok(games) => games,
            Err(err) => {
                warn!(error = %err, "failed to list games for polling");
                return PassResult::Skipped;
            }
        };

        let tracked: Vec<_> = games
            .into_iter()
            .filter(|game| game.event_id.is_some())
            .collect();
        if tracked.is_empty() {
            return PassResult::Ok;
        }

        // One scoreboard fetch serves every game in this cycle.
        let scoreboard = match self.app.score_source().fetch_scoreboard().await {
            Ok(scoreboard) => scoreboard,
            Err(err) => {
                warn!(error = %err, "scoreboard fetch failed");
                return PassResult::UpstreamFailed;
            }
        };

        for game in &tracked {
            let Some(event_id) = game.event_id.as_deref() else {
                continue;
            };
            let Some(live) = scoreboard.live_score(event_id) else {
                debug!(game_id = %game.id, event_id, "event not on scoreboard");
                continue;
            };

            if let Err(err) = sync_service::sync_game(&self.app, &store, game, &live).await {
                warn!(game_id = %game.id, error = %err, "sync pass failed for game");
            }
        }

        PassResult::Ok
    }
}

/// Outcome of one poll pass, steering the next delay.
enum PassResult {
    /// Cycle completed (possibly with per-game failures).
    Ok,
    /// The scoreboard itself was unreachable.
    UpstreamFailed,
    /// Nothing to do (degraded mode or listing failed).
    Skipped,
}

/// Handle used to stop the poller on shutdown.
///
/// Signal it with [`Notify::notify_one`] so the permit is kept even when the
/// poller has not parked on the handle yet.
pub fn shutdown_handle() -> Arc<Notify> {
    Arc::new(Notify::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            game_store::{GameStore, memory::MemoryGameStore},
            models::GameEntity,
        },
        services::score_source::{ScoreSource, ScoreSourceResult, Scoreboard},
        state::AppState,
    };
    use futures::future::BoxFuture;
    use time::macros::datetime;
    use uuid::Uuid;

    /// Score source whose fetch never resolves, pinning the poller mid-pass.
    struct StalledScoreSource;

    impl ScoreSource for StalledScoreSource {
        fn fetch_scoreboard(&self) -> BoxFuture<'static, ScoreSourceResult<Scoreboard>> {
            Box::pin(futures::future::pending())
        }
    }

    async fn app_with_tracked_game(source: Arc<dyn ScoreSource>) -> SharedState {
        let app = AppState::new(AppConfig::default(), source);
        let store = Arc::new(MemoryGameStore::new());
        store
            .create_game(GameEntity {
                id: Uuid::new_v4(),
                name: "Super Bowl LX".into(),
                event_id: Some("401671889".into()),
                game_date: datetime!(2026-02-08 18:30 UTC),
            })
            .await
            .unwrap();
        app.set_game_store(store).await;
        app
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_mid_pass_stops_the_poller() {
        let app = app_with_tracked_game(Arc::new(StalledScoreSource)).await;
        let shutdown = shutdown_handle();
        let handle = ScorePoller::new(app, Arc::clone(&shutdown)).spawn();

        // Let the task park inside its scoreboard fetch before signalling.
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        shutdown.notify_waiters();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller exits after shutdown is signalled mid-pass")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_permit_sent_before_the_poller_parks_is_kept() {
        let app = app_with_tracked_game(Arc::new(StalledScoreSource)).await;
        let shutdown = shutdown_handle();

        // Permit stored before the task ever polls its waiter.
        shutdown.notify_one();
        let handle = ScorePoller::new(app, Arc::clone(&shutdown)).spawn();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller exits on a pre-stored shutdown permit")
            .unwrap();
    }
}
