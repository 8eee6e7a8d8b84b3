pub mod environment;
pub mod manager;
pub mod types;

pub use environment::Environment;
pub use manager::{ConfigError, ConfigManager};
pub use types::{RegistryConfig, Settings, UpdaterConfig};
