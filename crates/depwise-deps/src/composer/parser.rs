//! composer.json / composer.lock extraction

use super::lockfile::{version_field, LockfileResolver};
use crate::types::{Dependency, DependencyFile, Requirement, Scope, SubdependencyMetadata};
use crate::{version, DependencySet, Error, FileParser, Result};
use serde_json::Value;
use tracing::debug;

/// Manifest file name
pub const MANIFEST_NAME: &str = "composer.json";
/// Lockfile name
pub const LOCKFILE_NAME: &str = "composer.lock";
/// Package manager tag
pub const PACKAGE_MANAGER: &str = "composer";

/// Outcome of extracting one manifest declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The declaration produced a dependency
    Extracted(Dependency),
    /// The declaration was left out, with the reason
    Skipped {
        /// Declared name
        name: String,
        /// Why it was skipped
        reason: SkipReason,
    },
}

/// Why a manifest declaration was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Platform or virtual package (`php`, `ext-json`, ...)
    NotAPackage,
    /// Missing from the lockfile, or its version cannot be compared
    UnusableVersion,
}

/// Whether `name` follows the two-segment `vendor/package` convention
///
/// Platform packages such as `php`, `ext-*` or `composer-plugin-api` are
/// not real dependencies.
pub fn is_package(name: &str) -> bool {
    match name.split_once('/') {
        Some((vendor, package)) => {
            !vendor.is_empty() && !package.is_empty() && !package.contains('/')
        }
        None => false,
    }
}

/// Composer extraction over decoded manifest and lockfile trees
///
/// Decoding is the only file-syntax work done here; everything else reads
/// known keys of the generic JSON structure.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComposerFileParser;

impl ComposerFileParser {
    /// Create a new composer parser
    pub fn new() -> Self {
        Self
    }

    /// Extract the canonical dependency set from decoded documents
    ///
    /// Manifest-derived entries are applied before lockfile-derived ones, so
    /// lockfile versions and metadata take precedence when both define them.
    pub fn extract(&self, manifest: &Value, lockfile: Option<&Value>) -> Result<DependencySet> {
        let mut dependencies = DependencySet::new();

        for extraction in self.manifest_extractions(manifest, lockfile)? {
            match extraction {
                Extraction::Extracted(dependency) => dependencies.add(dependency),
                Extraction::Skipped { name, reason } => {
                    debug!(dependency = %name, ?reason, "skipping manifest declaration");
                }
            }
        }

        if let Some(lock) = lockfile {
            dependencies += self.lockfile_dependencies(lock)?;
        }

        Ok(dependencies)
    }

    /// One extraction outcome per manifest declaration, in manifest order
    pub fn manifest_extractions(
        &self,
        manifest: &Value,
        lockfile: Option<&Value>,
    ) -> Result<Vec<Extraction>> {
        let resolver = lockfile.map(LockfileResolver::new);
        let mut extractions = Vec::new();

        for scope in Scope::ALL {
            let Some(declared) = manifest.get(scope.manifest_key()).and_then(Value::as_object)
            else {
                continue;
            };

            for (name, req) in declared {
                extractions.push(self.extract_declaration(name, req, scope, resolver.as_ref())?);
            }
        }

        Ok(extractions)
    }

    fn extract_declaration(
        &self,
        name: &str,
        req: &Value,
        scope: Scope,
        resolver: Option<&LockfileResolver<'_>>,
    ) -> Result<Extraction> {
        if !is_package(name) {
            return Ok(Extraction::Skipped {
                name: name.to_string(),
                reason: SkipReason::NotAPackage,
            });
        }

        let requirement = req.as_str().unwrap_or_default();

        let (resolved_version, source) = match resolver {
            Some(resolver) => {
                let resolved = resolver.version(name, scope);
                // Only versions later logic can compare are kept.
                if !resolved.as_deref().is_some_and(version::is_usable_version) {
                    return Ok(Extraction::Skipped {
                        name: name.to_string(),
                        reason: SkipReason::UnusableVersion,
                    });
                }
                (resolved, resolver.source(name, scope, requirement))
            }
            None => (None, None),
        };

        let dependency = Dependency::new(
            name,
            resolved_version,
            vec![Requirement::new(requirement, MANIFEST_NAME, scope).with_source(source)],
            PACKAGE_MANAGER,
        )?;

        Ok(Extraction::Extracted(dependency))
    }

    /// Lockfile-only entries for every pinned package
    pub fn lockfile_dependencies(&self, lockfile: &Value) -> Result<DependencySet> {
        let resolver = LockfileResolver::new(lockfile);
        let mut dependencies = DependencySet::new();

        for scope in Scope::ALL {
            for details in resolver.entries(scope) {
                let Some(name) = details.get("name").and_then(Value::as_str) else {
                    continue;
                };
                if !is_package(name) {
                    continue;
                }

                let Some(raw) = version_field(details) else {
                    continue;
                };
                let resolved = version::strip_v_prefix(&raw);
                if !version::is_usable_version(resolved) {
                    continue;
                }

                let dependency = Dependency::lockfile_only(
                    name,
                    Some(resolved.to_string()),
                    PACKAGE_MANAGER,
                    SubdependencyMetadata {
                        production: scope != Scope::Development,
                    },
                )?;
                dependencies.add(dependency);
            }
        }

        Ok(dependencies)
    }
}

impl FileParser for ComposerFileParser {
    fn package_manager(&self) -> &'static str {
        PACKAGE_MANAGER
    }

    fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>> {
        let manifest_file = files
            .iter()
            .find(|f| f.name == MANIFEST_NAME)
            .ok_or_else(|| Error::DependencyFileNotFound(MANIFEST_NAME.to_string()))?;
        let manifest = decode(manifest_file)?;

        let lockfile = files
            .iter()
            .find(|f| f.name == LOCKFILE_NAME)
            .map(decode)
            .transpose()?;

        Ok(self
            .extract(&manifest, lockfile.as_ref())?
            .into_dependencies())
    }
}

fn decode(file: &DependencyFile) -> Result<Value> {
    serde_json::from_str(&file.content).map_err(|e| Error::DependencyFileNotParseable {
        path: file.path(),
        message: e.to_string(),
    })
}
