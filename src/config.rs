//! Application-level configuration: scoreboard endpoint, polling cadence,
//! and network timeouts.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SQUARES_BACK_CONFIG_PATH";

/// Public NFL scoreboard endpoint polled for live scores.
const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Scoreboard URL queried by the score source adapter.
    pub scoreboard_url: String,
    /// Pause between two poller passes.
    pub poll_interval: Duration,
    /// Upper bound for any single upstream request.
    pub request_timeout: Duration,
    /// Cap for the poller's failure backoff.
    pub max_backoff: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        poll_interval_s = config.poll_interval.as_secs(),
                        "loaded configuration from file"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoreboard_url: DEFAULT_SCOREBOARD_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

/// JSON representation of the configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    scoreboard_url: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_backoff_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            scoreboard_url: raw.scoreboard_url.unwrap_or(defaults.scoreboard_url),
            poll_interval: raw
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_backoff: raw
                .max_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_backoff),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"poll_interval_secs": 30}"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.scoreboard_url, DEFAULT_SCOREBOARD_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.max_backoff, DEFAULT_MAX_BACKOFF);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }
}
