//! Version string shape rules
//!
//! depwise never evaluates version constraints; it only decides whether a
//! resolved version string is something later comparison logic can reason
//! about. A usable version either begins with a digit or is a full 40
//! character git commit SHA.

use regex::Regex;
use std::sync::LazyLock;

static GIT_SHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("valid SHA pattern"));

/// Conventional prefix of a floating branch version or requirement
pub const DEV_BRANCH_PREFIX: &str = "dev-";

/// Whether `version` is a full 40 character lowercase hexadecimal commit SHA
pub fn is_git_sha(version: &str) -> bool {
    GIT_SHA.is_match(version)
}

/// Whether a resolved version can be compared later in the pipeline
pub fn is_usable_version(version: &str) -> bool {
    version.starts_with(|c: char| c.is_ascii_digit()) || is_git_sha(version)
}

/// Whether a version may be stored on a `Dependency`
///
/// Empty strings are tolerated here (they mean "unknown") but not by
/// [`is_usable_version`].
pub fn is_valid_shape(version: &str) -> bool {
    version.is_empty() || is_usable_version(version)
}

/// Strip a single leading `v` from a lockfile version
pub fn strip_v_prefix(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Whether a version or requirement names a floating branch (`dev-main`)
pub fn is_dev_branch(value: &str) -> bool {
    value.starts_with(DEV_BRANCH_PREFIX)
}

/// Branch name of a floating requirement: `dev-main#abc123` → `main`
pub fn branch_name(requirement: &str) -> &str {
    let stripped = requirement
        .strip_prefix(DEV_BRANCH_PREFIX)
        .unwrap_or(requirement);
    stripped.split('#').next().unwrap_or(stripped)
}
