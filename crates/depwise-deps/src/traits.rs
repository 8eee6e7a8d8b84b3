//! Core traits for dependency extraction

use crate::types::{Dependency, DependencyFile};
use crate::Result;

/// Ecosystem-specific extraction of canonical dependencies
///
/// Implementations receive the files fetched from source control and return
/// one canonical [`Dependency`] per name, in deterministic (manifest) order.
pub trait FileParser: Send + Sync {
    /// Package manager tag stamped on every extracted dependency
    fn package_manager(&self) -> &'static str;

    /// Extract dependencies from the fetched files
    ///
    /// # Errors
    /// Returns an error if a required file is missing or cannot be decoded
    fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>>;
}
