//! Error types for depwise-registry

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a [`Transport`](crate::Transport) before any response arrived
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established or was reset
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other transport-level failure
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts and socket failures, the conditions reported as a timed out source
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

/// Main error type for registry operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// XML feed could not be read
    #[error("Failed to parse XML feed: {0}")]
    Xml(String),

    /// Descriptor endpoint is not an http(s) URL
    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),

    /// Descriptor carries a protocol tag other than `v2` or `v3`
    #[error("Unknown repository type: {0}")]
    UnknownRepositoryType(String),

    /// Registry answered 401, 402 or 403
    #[error("Authentication failed for private source {source_url}")]
    PrivateSourceAuthenticationFailure {
        /// Index URL of the registry
        source_url: String,
    },

    /// Private registry timed out or dropped the connection
    #[error("Private source {source_url} timed out")]
    PrivateSourceTimedOut {
        /// Index URL of the registry
        source_url: String,
    },

    /// Raw transport failure from the default registry
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Misconfiguration that should abort the whole job
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownRepositoryType(_) | Self::InvalidUrl(_))
    }

    /// Index URL of the private source this error concerns, if any
    pub fn source_url(&self) -> Option<&str> {
        match self {
            Self::PrivateSourceAuthenticationFailure { source_url }
            | Self::PrivateSourceTimedOut { source_url } => Some(source_url),
            _ => None,
        }
    }
}
