//! Storage backend supervisor.
//!
//! Owns the connect / health-check / reconnect lifecycle so the rest of the
//! application only ever consults the degraded flag. While no backend is
//! installed, write paths answer 503 and the poller skips its cycles.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep a storage backend connected for the lifetime of the process.
///
/// Each failed connection attempt doubles the retry delay up to
/// [`MAX_DELAY`]; once connected, the store is health-checked on a fixed
/// interval and reconnected in place when a check fails.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_game_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;
                supervise(&state, store).await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Health-check loop for one established connection. Returns once the store
/// is considered lost, handing control back to the connect loop.
async fn supervise(state: &SharedState, store: Arc<dyn GameStore>) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded() {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false);
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        if reconnect_with_backoff(state, &store).await {
            state.update_degraded(false);
            sleep(HEALTH_POLL_INTERVAL).await;
        } else {
            warn!("exhausted storage reconnect attempts; staying in degraded mode");
            return;
        }
    }
}

/// Try to revive a store whose health check failed. The first failed attempt
/// flips the degraded flag so clients learn immediately.
async fn reconnect_with_backoff(state: &SharedState, store: &Arc<dyn GameStore>) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!("storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
