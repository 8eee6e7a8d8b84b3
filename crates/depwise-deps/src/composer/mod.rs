//! Composer-style manifest and lockfile interpretation

mod lockfile;
mod parser;

pub use lockfile::LockfileResolver;
pub use parser::{
    is_package, ComposerFileParser, Extraction, SkipReason, LOCKFILE_NAME, MANIFEST_NAME,
    PACKAGE_MANAGER,
};
