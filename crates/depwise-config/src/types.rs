use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for a depwise updater
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdaterConfig {
    /// Schema version for migrations
    pub version: String,

    /// Runtime settings
    #[serde(default)]
    pub settings: Settings,

    /// Package registries queried for available versions, in preference order
    #[serde(default)]
    pub registries: Vec<RegistryConfig>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            settings: Settings::default(),
            registries: Vec::new(),
        }
    }
}

/// Runtime settings for update jobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Re-raise job failures after reporting them.
    /// `None` means "detect from the environment".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_ci: Option<bool>,

    /// Bypass the shared registry response cache
    #[serde(default)]
    pub caching_disabled: bool,

    /// Max registry lookups in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_lookups: usize,

    /// Client-side request rate limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whole-job timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_timeout_secs: Option<u64>,

    /// User agent sent to registries
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict_ci: None,
            caching_disabled: false,
            max_concurrent_lookups: default_max_concurrent(),
            requests_per_second: None,
            request_timeout_secs: default_request_timeout(),
            job_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Settings {
    /// Layer environment facts over file values
    ///
    /// An explicit `strict_ci` in the file wins over detection; the caching
    /// switch can only be turned on by the environment, never off.
    pub fn apply_environment(&mut self, env: &Environment) {
        if self.strict_ci.is_none() {
            self.strict_ci = Some(env.github_actions);
        }
        if env.caching_disabled {
            self.caching_disabled = true;
        }
    }

    /// Whether failures should terminate the job after reporting
    ///
    /// Falls back to detecting a CI runner in the process environment when
    /// `strict_ci` is unset.
    pub fn is_strict(&self) -> bool {
        self.is_strict_in(&Environment::capture())
    }

    /// Same as [`Settings::is_strict`] against a given environment snapshot
    pub fn is_strict_in(&self, env: &Environment) -> bool {
        self.strict_ci.unwrap_or(env.github_actions)
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whole-job timeout, if any
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }

    /// Lookup concurrency, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_lookups.max(1)
    }
}

/// A package registry as declared in configuration
///
/// `repository_type` stays a free-form string here; it is validated when the
/// registry client builds a descriptor from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Protocol dialect tag (`v2` or `v3`)
    #[serde(rename = "type")]
    pub repository_type: String,

    /// Index URL identifying the registry
    pub repository_url: String,

    /// Flat versions endpoint (v3) or feed endpoint (v2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions_url: Option<String>,

    /// Paginated registration endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,

    /// Search endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,

    /// Authorization header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("depwise/{}", env!("CARGO_PKG_VERSION"))
}
