//! Configuration persistence port

use std::path::Path;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Where the configuration lives
    fn location(&self) -> &Path;

    /// Read the stored configuration; a missing file is an empty config.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored configuration
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    fn exists(&self) -> bool {
        self.location().is_file()
    }

    /// Write the defaults. Never overwrites an existing file.
    async fn init(&self) -> Result<AppConfig, ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.location().display().to_string(),
            ));
        }
        let defaults = AppConfig::defaults();
        self.save(&defaults).await?;
        Ok(defaults)
    }
}
