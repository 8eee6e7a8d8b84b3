//! # depwise-deps
//!
//! Canonical dependency model for the depwise update pipeline.
//!
//! This crate provides functionality to:
//! - Model dependencies, their manifest requirements and provenance
//! - Merge same-named dependencies discovered in several places into one entry
//! - Resolve installed versions and sources from a decoded lockfile
//! - Extract dependencies from composer-style manifest/lockfile pairs
//!
//! ## Architecture
//!
//! - Plain value types (`Dependency`, `Requirement`, `Source`)
//! - An order-preserving accumulator (`DependencySet`)
//! - A pluggable `FileParser` trait for ecosystem-specific extraction
//!
//! ## Example
//!
//! ```rust
//! use depwise_deps::{ComposerFileParser, DependencyFile, FileParser};
//!
//! # fn example() -> depwise_deps::Result<()> {
//! let files = vec![
//!     DependencyFile::new("composer.json", r#"{"require": {"vendor/pkg": "^1.0"}}"#, "/"),
//!     DependencyFile::new(
//!         "composer.lock",
//!         r#"{"packages": [{"name": "vendor/pkg", "version": "1.2.0"}]}"#,
//!         "/",
//!     ),
//! ];
//!
//! for dep in ComposerFileParser::new().parse(&files)? {
//!     println!("{}: {:?}", dep.name, dep.version);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod composer;
pub mod error;
pub mod set;
pub mod traits;
pub mod types;
pub mod version;

// Re-export main types and traits
pub use error::{Error, Result};
pub use set::DependencySet;
pub use traits::FileParser;
pub use types::{
    Dependency, DependencyFile, GitSource, Requirement, Scope, Source, SubdependencyMetadata,
};

// Re-export the composer extraction pipeline
pub use composer::{ComposerFileParser, Extraction, LockfileResolver, SkipReason};
