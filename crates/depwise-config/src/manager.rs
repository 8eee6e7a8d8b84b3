use crate::environment::Environment;
use crate::types::UpdaterConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Manager for updater configuration
///
/// Loads `UpdaterConfig` from a TOML file, layers the process environment on
/// top and can write it back atomically.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Option<PathBuf>,
    config: UpdaterConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config_path: None,
            config: UpdaterConfig::default(),
        }
    }
}

impl ConfigManager {
    /// Load config from specific path
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = tokio::fs::read_to_string(path).await?;
        let mut manager = Self::from_toml_str(&contents)?;
        manager.config_path = Some(path.to_path_buf());
        Ok(manager)
    }

    /// Parse config from TOML text without touching the filesystem
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: UpdaterConfig = toml::from_str(contents)?;
        validate(&config)?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Wrap an already-built config
    pub fn from_config(config: UpdaterConfig) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Initialize a default config file at `path`
    pub async fn init_at(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let manager = Self {
            config_path: Some(path.to_path_buf()),
            config: UpdaterConfig::default(),
        };
        manager.save().await?;
        Ok(manager)
    }

    /// Layer environment facts over the loaded settings
    pub fn with_environment(mut self, env: &Environment) -> Self {
        self.config.settings.apply_environment(env);
        self
    }

    /// Save config to disk atomically
    ///
    /// Uses a temporary file and atomic rename to prevent corruption
    pub async fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| ConfigError::Invalid("config has no backing file".to_string()))?;

        let toml_str = toml::to_string_pretty(&self.config)?;
        let temp_path = path.with_extension("toml.tmp");
        tokio::fs::write(&temp_path, toml_str).await?;
        tokio::fs::rename(&temp_path, path).await?;

        Ok(())
    }

    /// Get reference to config
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Get mutable reference to config (caller must call save())
    pub fn config_mut(&mut self) -> &mut UpdaterConfig {
        &mut self.config
    }

    /// Consume the manager, returning the config
    pub fn into_config(self) -> UpdaterConfig {
        self.config
    }

    /// Path the config was loaded from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

fn validate(config: &UpdaterConfig) -> Result<(), ConfigError> {
    for registry in &config.registries {
        if registry.repository_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "registry entry is missing repository_url".to_string(),
            ));
        }
    }

    if config.settings.request_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "request_timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RegistryConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("depwise.toml");

        let manager = ConfigManager::init_at(&config_path).await.unwrap();
        assert_eq!(manager.config().version, "1.0");

        let loaded = ConfigManager::load_from(&config_path).await.unwrap();
        assert_eq!(loaded.config(), manager.config());
        assert_eq!(loaded.config_path(), Some(config_path.as_path()));
    }

    #[tokio::test]
    async fn test_save_persists_changes() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("depwise.toml");

        let mut manager = ConfigManager::init_at(&config_path).await.unwrap();
        manager.config_mut().registries.push(RegistryConfig {
            repository_type: "v3".to_string(),
            repository_url: "https://nuget.example.com/v3/index.json".to_string(),
            versions_url: None,
            registration_url: None,
            search_url: Some("https://nuget.example.com/query?q=pkg".to_string()),
            auth_header: None,
        });
        manager.save().await.unwrap();

        let loaded = ConfigManager::load_from(&config_path).await.unwrap();
        assert_eq!(loaded.config().registries.len(), 1);
        assert!(!config_path.with_extension("toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::load_from(&temp_dir.path().join("nope.toml")).await;
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = ConfigManager::from_toml_str(
            r#"
version = "1.0"
[settings]
request_timeout_secs = 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_without_path_fails() {
        let manager = ConfigManager::default();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(manager.save());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_with_environment() {
        let manager = ConfigManager::default().with_environment(&Environment {
            github_actions: true,
            caching_disabled: false,
        });
        assert!(manager.config().settings.is_strict());
    }
}
