//! Error taxonomy for remote fetches, the cache store and application startup.

use thiserror::Error;

/// Failure while loading a resource from a remote API.
///
/// These propagate to the caller and are never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFetchError {
    /// Transport failure, timeout, or an unexpected HTTP status
    #[error("Network Error: {0}")]
    Network(String),

    /// Missing, invalid or unauthorized API token (401/403)
    #[error("Authentication Error: {0}")]
    Auth(String),

    /// Response body did not have the expected shape
    #[error("Malformed Response: {0}")]
    MalformedResponse(String),

    /// The API does not know the requested symbol (404)
    #[error("Unknown Symbol: {0}")]
    UnknownSymbol(String),

    /// The API rejected the request because of its rate limit (429)
    #[error("Rate Limited: {0}")]
    RateLimited(String),

    /// The request was rejected locally before anything was sent
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
}

impl RemoteFetchError {
    /// Whether asking again later could plausibly succeed.
    ///
    /// Used for reporting only; callers do not retry on their own.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RemoteFetchError::Network(_) => true,
            RemoteFetchError::RateLimited(_) => true,
            RemoteFetchError::Auth(_) => false, // token needs fixing
            RemoteFetchError::MalformedResponse(_) => false,
            RemoteFetchError::UnknownSymbol(_) => false,
            RemoteFetchError::InvalidRequest(_) => false,
        }
    }
}

impl From<serde_json::Error> for RemoteFetchError {
    fn from(err: serde_json::Error) -> Self {
        RemoteFetchError::MalformedResponse(format!("JSON deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for RemoteFetchError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API token as a query parameter.
        let err = err.without_url();
        if err.is_decode() {
            RemoteFetchError::MalformedResponse(err.to_string())
        } else {
            RemoteFetchError::Network(err.to_string())
        }
    }
}

/// The cache store could not be reached (connection refused, timeout, I/O).
///
/// Never surfaces past the read-through wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cache Unavailable: {0}")]
pub struct CacheUnavailableError(pub String);

impl From<redis::RedisError> for CacheUnavailableError {
    fn from(err: redis::RedisError) -> Self {
        CacheUnavailableError(format!("Redis error: {}", err))
    }
}

/// Application-level failures: configuration, logging setup, client construction.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Config Error: {0}")]
    ConfigError(String),

    #[error("Logging Error: {0}")]
    LoggingError(String),
}

impl From<fern::InitError> for DashboardError {
    fn from(err: fern::InitError) -> Self {
        DashboardError::LoggingError(err.to_string())
    }
}

impl From<url::ParseError> for DashboardError {
    fn from(err: url::ParseError) -> Self {
        DashboardError::ConfigError(format!("Invalid URL: {}", err))
    }
}
