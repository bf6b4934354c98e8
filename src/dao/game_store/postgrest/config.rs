use std::time::Duration;

use super::error::{PostgrestDaoError, PostgrestResult};

/// Environment variable holding the PostgREST endpoint base URL.
pub const URL_ENV: &str = "SQUARES_BACK_POSTGREST_URL";
/// Environment variable holding the service-role API key.
pub const KEY_ENV: &str = "SQUARES_BACK_POSTGREST_KEY";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing how to reach the PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Base URL of the REST endpoint, without a trailing slash.
    pub base_url: String,
    /// Service-role key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Upper bound for any single request.
    pub request_timeout: Duration,
}

impl PostgrestConfig {
    /// Construct a configuration from an explicit base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> PostgrestResult<Self> {
        let base_url =
            std::env::var(URL_ENV).map_err(|_| PostgrestDaoError::MissingEnvVar { var: URL_ENV })?;
        let api_key =
            std::env::var(KEY_ENV).map_err(|_| PostgrestDaoError::MissingEnvVar { var: KEY_ENV })?;
        Ok(Self::new(base_url, api_key))
    }

    /// Whether both connection variables are present in the environment.
    pub fn env_configured() -> bool {
        std::env::var(URL_ENV).is_ok() && std::env::var(KEY_ENV).is_ok()
    }
}
