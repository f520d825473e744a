//! Error types for HTTP task store operations.

use tasklist_core::TaskId;
use thiserror::Error;

/// Errors that can occur while talking to the remote task store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The configured base URL could not be parsed.
    #[error("Invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        /// The rejected input.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// The base URL is not an http(s) URL that can carry path segments.
    #[error("Unsupported base URL: {0}")]
    UnsupportedBaseUrl(String),

    /// The store answered 404 for a task-scoped request.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// The store answered with a non-success status.
    #[error("{method} {path} returned {status}: {body}")]
    Status {
        /// HTTP method of the failed request.
        method: &'static str,
        /// Request path.
        path: String,
        /// Response status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Transport, timeout or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    /// Returns true when the failure came from the transport layer rather than the store.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_connect() || err.is_timeout() || err.is_request())
    }
}
