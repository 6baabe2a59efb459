//! Error types for tour-search.

use crate::search::retry::ExhaustedRetries;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Transport-level failures from the tour backend.
///
/// The orchestration core treats every variant uniformly as "operation
/// failed" and never interprets status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of a price-search job cycle.
///
/// Both variants are routed to the same commit point: the orchestrator sets
/// the store's error flag and swallows the error. Superseded outcomes are
/// not errors and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("price poll failed: {0}")]
    Exhausted(#[from] ExhaustedRetries<ApiError>),

    #[error("poll could not be scheduled: {reason}")]
    Scheduling { reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
