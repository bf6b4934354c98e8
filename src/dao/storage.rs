use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure talking to the active storage backend, whatever it is.
///
/// Backends collapse their own error enums into this one shape; callers only
/// ever branch on "storage worked or it did not".
#[derive(Debug, Error)]
#[error("storage unavailable: {message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Box<dyn Error + Send + Sync>,
}

impl StorageError {
    /// Wrap a backend failure with a human-readable summary.
    pub fn unavailable(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Box::new(source),
        }
    }
}
