//! Error types for DNS-01 challenge handling
//!
//! The taxonomy is closed: callers match on the variant, never on the message.
//! `Conflict` and `NotFound` are expected signals that the reconciler handles
//! locally; every other variant is fatal for the operation.

use thiserror::Error;

/// Result type alias for DNS-01 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Bad credentials or a failing auth endpoint
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The provider rejected the request (HTTP 400 or 500)
    #[error("DNS API error: {0}")]
    Api(String),

    /// An RRSet with this name and type already exists (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Zone or RRSet does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// No managed zone matches any suffix of the domain
    #[error("No managed zone found for {domain} (tried: {})", tried.join(", "))]
    ZoneResolution {
        /// Domain that was being resolved
        domain: String,
        /// Zone candidates that were checked, most specific first
        tried: Vec<String>,
    },

    /// Invalid credentials mode, malformed URL or invalid input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Send failures, timeouts and unclassified HTTP statuses
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a provider API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a zone resolution error
    pub fn zone_resolution(domain: impl Into<String>, tried: Vec<String>) -> Self {
        Self::ZoneResolution {
            domain: domain.into(),
            tried,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
