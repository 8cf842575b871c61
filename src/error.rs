//! Error types for news-collector
//!
//! This module provides error handling for the crate, including:
//! - A top-level [`Error`] aggregating the domain-specific enums
//! - [`FetchError`] for API transport and protocol failures, classified
//!   for the retry policy
//! - [`StoreError`] for persistence failures
//! - [`CleanRejection`] for per-article validation rejects

use thiserror::Error;

/// Result type alias for news-collector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for news-collector
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.endpoint")
        key: Option<String>,
    },

    /// Fetching from the news API failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Database operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Report generation failed
    #[error("report error: {0}")]
    Report(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from the fetch client
///
/// The classification here drives the retry policy: transient transport
/// failures and throttling are retryable, authentication and API-level
/// rejections are not.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection or transport failure
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 429: the API throttled us; an expected signal, retried with backoff
    #[error("rate limited by the API (HTTP 429)")]
    RateLimited,

    /// HTTP 401/403: credentials rejected; retrying cannot succeed
    #[error("authentication failed (HTTP {status})")]
    AuthFailure {
        /// Status code returned by the API (401 or 403)
        status: u16,
    },

    /// HTTP 5xx upstream failure
    #[error("server error (HTTP {status})")]
    ServerError {
        /// Status code returned by the API
        status: u16,
    },

    /// Any other HTTP status the API is not documented to return
    #[error("unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// Status code returned by the API
        status: u16,
    },

    /// HTTP 200 whose body carries `status != "ok"`
    #[error("API error ({code}): {message}")]
    Api {
        /// Machine-readable error code from the response body
        code: String,
        /// Human-readable message from the response body
        message: String,
    },

    /// Response body could not be decoded as the expected JSON shape
    #[error("failed to decode API response: {0}")]
    Decode(String),

    /// Retry budget exhausted; carries the last underlying cause
    #[error("retries exhausted after {attempts} attempts: {source}")]
    Exhausted {
        /// Total number of attempts made (initial call plus retries)
        attempts: u32,
        /// The final transient error that ended the attempts
        #[source]
        source: Box<FetchError>,
    },
}

/// Persistence errors from the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or connect to the database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Read query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Row write failed
    #[error("write failed: {0}")]
    WriteFailure(String),
}

/// Reasons the cleaner rejects a raw article
///
/// Title and URL are the only fields with no safe default. Rejections are
/// counted and logged rather than propagated; one bad article never aborts
/// the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CleanRejection {
    /// `title` missing, or empty after trimming and cleaning
    #[error("missing or empty title")]
    MissingTitle,

    /// `url` missing or empty after trimming
    #[error("missing or empty url")]
    MissingUrl,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_converts_into_top_level_error() {
        let err: Error = FetchError::Timeout.into();
        assert!(matches!(err, Error::Fetch(FetchError::Timeout)));
    }

    #[test]
    fn exhausted_preserves_the_underlying_cause() {
        let err = FetchError::Exhausted {
            attempts: 4,
            source: Box::new(FetchError::ServerError { status: 503 }),
        };

        let msg = err.to_string();
        assert!(msg.contains("4 attempts"), "message was: {msg}");
        assert!(msg.contains("503"), "message was: {msg}");

        let source = std::error::Error::source(&err).expect("source must be set");
        assert!(source.to_string().contains("503"));
    }

    #[test]
    fn clean_rejection_messages_name_the_missing_field() {
        assert_eq!(CleanRejection::MissingTitle.to_string(), "missing or empty title");
        assert_eq!(CleanRejection::MissingUrl.to_string(), "missing or empty url");
    }

    #[test]
    fn store_error_wraps_into_error_display() {
        let err: Error = StoreError::WriteFailure("disk full".to_string()).into();
        assert_eq!(err.to_string(), "store error: write failed: disk full");
    }
}
