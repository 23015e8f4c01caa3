//! Error types shared by the music catalog client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures that can occur while talking to the music catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build catalog client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or timed out.
    #[error("failed to send catalog request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog answered with a non-success status code.
    #[error("unexpected catalog response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be decoded.
    #[error("failed to decode catalog response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog reported an error inside a successful response body.
    #[error("catalog rejected request to `{path}`: {message}")]
    Api { path: String, message: String },
}
