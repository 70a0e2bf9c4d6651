//! Error types shared by the question providers.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias returning [`SourceError`] failures.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failures raised while fetching a raw question from a provider.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[cfg(feature = "http-sources")]
    #[error("failed to build provider HTTP client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[cfg(feature = "http-sources")]
    #[error("failed to send provider request to `{url}`")]
    RequestSend {
        /// Requested endpoint.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with an unexpected status code.
    #[cfg(feature = "http-sources")]
    #[error("unexpected provider response status {status} for `{url}`")]
    RequestStatus {
        /// Requested endpoint.
        url: String,
        /// Status returned by the provider.
        status: reqwest::StatusCode,
    },
    /// The response body was not the expected JSON document.
    #[cfg(feature = "http-sources")]
    #[error("failed to decode provider response for `{url}`")]
    DecodeResponse {
        /// Requested endpoint.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered without any question in the payload.
    #[error("provider `{provider}` returned no question")]
    Empty {
        /// Provider name.
        provider: String,
    },
    /// The payload was well-formed JSON but its content could not be used.
    #[error("provider `{provider}` returned a malformed question: {reason}")]
    Malformed {
        /// Provider name.
        provider: String,
        /// What was wrong with the payload.
        reason: String,
    },
    /// A local question bank could not be read.
    #[error("failed to read question bank `{}`", path.display())]
    BankRead {
        /// Bank file location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A local question bank is not a JSON array of questions.
    #[error("failed to parse question bank `{}`", path.display())]
    BankParse {
        /// Bank file location.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
