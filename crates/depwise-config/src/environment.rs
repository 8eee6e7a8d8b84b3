//! Process environment facts relevant to update jobs

/// Set by GitHub Actions runners; turns on strict failure reporting
pub const GITHUB_ACTIONS_VAR: &str = "GITHUB_ACTIONS";
/// Disables the shared registry response cache when set to a truthy value
pub const CACHING_DISABLED_VAR: &str = "DEPWISE_CACHING_DISABLED";

/// Snapshot of the environment, captured once per process
///
/// Construct it directly in tests instead of mutating process state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Environment {
    /// Running inside a continuous-integration runner
    pub github_actions: bool,
    /// Registry response caching switched off
    pub caching_disabled: bool,
}

impl Environment {
    /// Read the current process environment
    pub fn capture() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            github_actions: lookup(GITHUB_ACTIONS_VAR).as_deref().is_some_and(is_truthy),
            caching_disabled: lookup(CACHING_DISABLED_VAR).as_deref().is_some_and(is_truthy),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(GITHUB_ACTIONS_VAR, "true"), (CACHING_DISABLED_VAR, "0")]);
        let env = Environment::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert!(env.github_actions);
        assert!(!env.caching_disabled);
    }

    #[test]
    fn test_missing_vars_are_false() {
        let env = Environment::from_lookup(|_| None);
        assert_eq!(env, Environment::default());
    }
}
