//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`PostgrestDaoError`] failures.
pub type PostgrestResult<T> = Result<T, PostgrestDaoError>;

/// Failures that can occur while talking to the PostgREST endpoint.
#[derive(Debug, Error)]
pub enum PostgrestDaoError {
    /// Required environment variable is missing.
    #[error("missing PostgREST environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build PostgREST client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send PostgREST request to `{table}`")]
    RequestSend {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint returned an unexpected status code.
    #[error("unexpected PostgREST response status {status} for `{table}`")]
    RequestStatus {
        table: &'static str,
        status: StatusCode,
    },
    /// Response payload could not be parsed into the expected rows.
    #[error("failed to decode PostgREST response for `{table}`")]
    DecodeResponse {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// A write that should return the affected row returned nothing.
    #[error("PostgREST write to `{table}` returned no rows")]
    EmptyWriteResponse { table: &'static str },
}
