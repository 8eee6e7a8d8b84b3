//! Version and provenance resolution against a decoded composer.lock

use crate::types::{GitSource, Scope, Source};
use crate::version;
use serde_json::Value;

/// Looks up installed versions and sources in a decoded lockfile
///
/// The lockfile is treated as a generic JSON tree; only the `packages`,
/// `packages-dev`, `name`, `version`, `source` and `dist` keys are read.
#[derive(Debug, Clone, Copy)]
pub struct LockfileResolver<'a> {
    lockfile: &'a Value,
}

impl<'a> LockfileResolver<'a> {
    /// Wrap a decoded lockfile
    pub fn new(lockfile: &'a Value) -> Self {
        Self { lockfile }
    }

    /// Entries of the section belonging to `scope`
    pub fn entries(&self, scope: Scope) -> &'a [Value] {
        self.lockfile
            .get(scope.lockfile_key())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entry named `name` in the section belonging to `scope`
    pub fn package(&self, name: &str, scope: Scope) -> Option<&'a Value> {
        self.entries(scope)
            .iter()
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Installed version of `name`
    ///
    /// A leading `v` is stripped. Floating branch versions (`dev-*`) are
    /// replaced by the commit recorded in `source.reference`.
    pub fn version(&self, name: &str, scope: Scope) -> Option<String> {
        let package = self.package(name, scope)?;
        let raw = version_field(package)?;
        let stripped = version::strip_v_prefix(&raw);

        if !version::is_dev_branch(stripped) {
            return Some(stripped.to_string());
        }

        package
            .pointer("/source/reference")
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Provenance of `name`, `None` meaning registry-implied
    ///
    /// `requirement` is the manifest constraint; a floating (`dev-*`)
    /// requirement yields a git source that follows a branch with no fixed
    /// reference.
    pub fn source(&self, name: &str, scope: Scope, requirement: &str) -> Option<Source> {
        let package = self.package(name, scope)?;
        let source = package.get("source").filter(|s| !s.is_null());

        if source.is_none()
            && package.pointer("/dist/type").and_then(Value::as_str) == Some("path")
        {
            return Some(Source::Path);
        }

        let source = source?;
        if source.get("type").and_then(Value::as_str) != Some("git") {
            return None;
        }

        let url = source
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if version::is_dev_branch(requirement) {
            return Some(Source::Git(GitSource {
                url,
                branch: Some(version::branch_name(requirement).to_string()),
                reference: None,
            }));
        }

        Some(Source::Git(GitSource {
            url,
            branch: None,
            reference: None,
        }))
    }
}

/// Version field of a lockfile entry, tolerating numeric JSON values
pub(crate) fn version_field(package: &Value) -> Option<String> {
    match package.get("version")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
