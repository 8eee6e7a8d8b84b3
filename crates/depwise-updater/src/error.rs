//! Error types for depwise-updater

use thiserror::Error;

/// Result type alias for job runs
pub type Result<T> = std::result::Result<T, Error>;

/// Ways a job run can end in failure
#[derive(Debug, Error)]
pub enum Error {
    /// Dependency model misconfiguration (unknown scope tag)
    #[error(transparent)]
    Deps(#[from] depwise_deps::Error),

    /// Registry misconfiguration (unknown repository type, bad URL)
    #[error(transparent)]
    Registry(#[from] depwise_registry::Error),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] depwise_config::ConfigError),

    /// A collaborator failed in a way that cannot be attributed to one dependency
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),

    /// The job was cancelled or ran out of time
    #[error("Job {job_id} was cancelled")]
    JobCancelled {
        /// Job identifier
        job_id: u64,
    },

    /// Strict CI mode: the job recorded errors
    #[error("Job {job_id} failed with {error_count} error(s)")]
    RunFailure {
        /// Job identifier
        job_id: u64,
        /// Number of recorded errors
        error_count: usize,
    },
}
