//! Core types for dependency management

use crate::version;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification of a dependency's purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Runtime dependency
    Runtime,
    /// Development-only dependency
    Development,
}

impl Scope {
    /// Both scopes, in the order manifests and lockfiles are walked
    pub const ALL: [Scope; 2] = [Scope::Runtime, Scope::Development];

    /// Group tag recorded on requirements
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Runtime => "runtime",
            Scope::Development => "development",
        }
    }

    /// Manifest key declaring dependencies of this scope
    pub fn manifest_key(&self) -> &'static str {
        match self {
            Scope::Runtime => "require",
            Scope::Development => "require-dev",
        }
    }

    /// Lockfile section pinning dependencies of this scope
    pub fn lockfile_key(&self) -> &'static str {
        match self {
            Scope::Runtime => "packages",
            Scope::Development => "packages-dev",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "runtime" => Ok(Scope::Runtime),
            "development" => Ok(Scope::Development),
            other => Err(Error::UnknownScope(other.to_string())),
        }
    }
}

/// Provenance of a dependency's artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Package registry
    Registry,
    /// Local filesystem path
    Path,
    /// Version-control repository
    Git(GitSource),
}

/// Git provenance details
///
/// A floating requirement carries `branch` and no `reference`; a fixed pin
/// carries whatever the lockfile declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    /// Repository URL
    pub url: String,
    /// Branch followed by a floating requirement
    pub branch: Option<String>,
    /// Fixed reference (tag or commit)
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// A single manifest declaration of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Raw constraint string as declared
    pub requirement: String,
    /// Originating manifest path
    pub file: String,
    /// Provenance, `None` when registry-implied
    pub source: Option<Source>,
    /// Scope tags
    pub groups: Vec<String>,
}

impl Requirement {
    /// Create a requirement declared in `file` under a single scope
    pub fn new(requirement: impl Into<String>, file: impl Into<String>, scope: Scope) -> Self {
        Self {
            requirement: requirement.into(),
            file: file.into(),
            source: None,
            groups: vec![scope.as_str().to_string()],
        }
    }

    /// Attach a source
    pub fn with_source(mut self, source: Option<Source>) -> Self {
        self.source = source;
        self
    }
}

/// Metadata attached to lockfile-only (transitive) entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdependencyMetadata {
    /// Whether the entry is needed in production
    pub production: bool,
}

/// Canonical dependency entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Ecosystem-qualified identifier
    pub name: String,
    /// Resolved version, if known
    pub version: Option<String>,
    /// Every manifest declaration that references this dependency
    pub requirements: Vec<Requirement>,
    /// Package manager tag
    pub package_manager: String,
    /// Set on lockfile-only entries
    pub subdependency_metadata: Option<SubdependencyMetadata>,
}

impl Dependency {
    /// Create a top-level dependency declared by at least one manifest
    ///
    /// # Errors
    /// Returns [`Error::InvalidDependency`] for an empty name or when no
    /// requirement is given, and [`Error::MalformedVersion`] when the version
    /// is neither empty, numeric-leading, nor a 40 character SHA.
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        requirements: Vec<Requirement>,
        package_manager: impl Into<String>,
    ) -> Result<Self> {
        if requirements.is_empty() {
            return Err(Error::InvalidDependency(
                "a dependency without requirements must be lockfile-only".to_string(),
            ));
        }
        Self::build(name.into(), version, requirements, package_manager.into(), None)
    }

    /// Create an entry known only from the lockfile
    ///
    /// # Errors
    /// Same name and version checks as [`Dependency::new`].
    pub fn lockfile_only(
        name: impl Into<String>,
        version: Option<String>,
        package_manager: impl Into<String>,
        metadata: SubdependencyMetadata,
    ) -> Result<Self> {
        Self::build(
            name.into(),
            version,
            Vec::new(),
            package_manager.into(),
            Some(metadata),
        )
    }

    fn build(
        name: String,
        version: Option<String>,
        requirements: Vec<Requirement>,
        package_manager: String,
        subdependency_metadata: Option<SubdependencyMetadata>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidDependency(
                "dependency name cannot be empty".to_string(),
            ));
        }

        if let Some(v) = &version {
            if !version::is_valid_shape(v) {
                return Err(Error::MalformedVersion {
                    name,
                    version: v.clone(),
                });
            }
        }

        Ok(Self {
            name,
            version,
            requirements,
            package_manager,
            subdependency_metadata,
        })
    }

    /// Whether any manifest declares this dependency directly
    pub fn is_top_level(&self) -> bool {
        !self.requirements.is_empty()
    }

    /// Whether the dependency is needed at runtime
    ///
    /// Top-level dependencies count as production when any requirement is in
    /// the runtime group.
    pub fn is_production(&self) -> bool {
        if let Some(meta) = self.subdependency_metadata {
            if !self.is_top_level() {
                return meta.production;
            }
        }

        self.requirements
            .iter()
            .any(|r| r.groups.iter().any(|g| g == Scope::Runtime.as_str()))
    }

    /// Git source of the first requirement that declares one
    pub fn git_source(&self) -> Option<&GitSource> {
        self.requirements.iter().find_map(|r| match &r.source {
            Some(Source::Git(git)) => Some(git),
            _ => None,
        })
    }
}

/// A file fetched from source control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    /// File name relative to `directory`
    pub name: String,
    /// File content
    pub content: String,
    /// Directory the file was fetched from
    pub directory: String,
    /// Auxiliary configuration rather than a manifest or lockfile
    #[serde(default)]
    pub support_file: bool,
}

impl DependencyFile {
    /// Create a non-support file in `directory`
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        directory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            directory: directory.into(),
            support_file: false,
        }
    }

    /// Path of the file including its directory
    pub fn path(&self) -> String {
        let dir = self.directory.trim_end_matches('/');
        format!("{}/{}", dir, self.name)
    }
}
