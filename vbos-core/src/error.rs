/// Error types for the VBOS client
use thiserror::Error;

/// Main error type for API and session operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// The device could not reach the server
    #[error("You're offline: please check your connection and try again")]
    Offline,

    /// The server rejected the session token
    #[error("Session expired: please sign in again")]
    Unauthorized,

    /// The server answered with a non-success status
    #[error("Unable to fetch data from {url} (status {status})")]
    Http { url: String, status: u16 },

    /// The dataset catalog for a cluster could not be fetched
    #[error("Unable to fetch datasets for cluster {0}")]
    Catalog(String),

    /// Credentials were rejected at login
    #[error("{0}")]
    Login(String),

    /// A response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A pagination cursor or base URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation was cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,

    /// Reading or writing the persisted session failed
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Transport-level failure other than connectivity
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Type alias for Results using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
