//! Error types for depwise-deps

use thiserror::Error;

/// Result type alias using depwise-deps Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in depwise-deps
#[derive(Debug, Error)]
pub enum Error {
    /// A version string that is neither empty, numeric-leading, nor a git SHA
    #[error("Malformed version '{version}' for dependency '{name}'")]
    MalformedVersion {
        /// Dependency the version was attached to
        name: String,
        /// The rejected version string
        version: String,
    },

    /// Dependency could not be constructed
    #[error("Invalid dependency: {0}")]
    InvalidDependency(String),

    /// A manifest or lockfile could not be decoded
    #[error("Dependency file not parseable: {path}: {message}")]
    DependencyFileNotParseable {
        /// Path of the offending file
        path: String,
        /// Decoder message
        message: String,
    },

    /// A required manifest was not among the fetched files
    #[error("Dependency file not found: {0}")]
    DependencyFileNotFound(String),

    /// Scope tag outside the fixed runtime/development pair
    #[error("Unknown dependency scope: {0}")]
    UnknownScope(String),
}

impl Error {
    /// Whether this error indicates misconfiguration rather than a
    /// per-dependency condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnknownScope(_))
    }
}
