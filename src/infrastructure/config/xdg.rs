//! TOML config file under the XDG config directory

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "interview-desk";
const FILE_NAME: &str = "config.toml";

pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// `$XDG_CONFIG_HOME/interview-desk/config.toml`, or the platform equivalent
    pub fn new() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_path(base.join(APP_DIR).join(FILE_NAME))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, err: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }

    fn parse(&self, content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Malformed {
            path: self.path.display().to_string(),
            reason: e.message().to_string(),
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    fn location(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => self.parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::empty()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Written to a sibling file first, then renamed over the old one.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, content)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PresenceConfig;

    fn store_in(dir: &tempfile::TempDir) -> XdgConfigStore {
        XdgConfigStore::with_path(dir.path().join("nested").join(FILE_NAME))
    }

    #[test]
    fn default_location_is_app_scoped() {
        let store = XdgConfigStore::new();
        assert!(store.location().ends_with("interview-desk/config.toml"));
    }

    #[test]
    fn staging_file_sits_next_to_config() {
        let store = XdgConfigStore::with_path("/etc/desk/config.toml");
        assert_eq!(store.staging_path(), PathBuf::from("/etc/desk/config.toml.tmp"));
    }

    #[test]
    fn parses_presence_table() {
        let store = XdgConfigStore::with_path("config.toml");
        let config = store
            .parse(
                r#"
server_url = "http://localhost:8000"
upload_format = "flac"

[presence]
enabled = true
detector_cmd = "detect-faces"
"#,
            )
            .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.upload_format.as_deref(), Some("flac"));
        assert_eq!(config.detector_cmd(), Some("detect-faces"));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let store = XdgConfigStore::with_path("config.toml");
        let err = store.parse("sample_rate = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { ref path, .. } if path == "config.toml"));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists());
        assert_eq!(store.load().await.unwrap(), AppConfig::empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let config = AppConfig {
            server_url: Some("http://interviews.local".to_string()),
            sample_rate: Some(48_000),
            presence: Some(PresenceConfig {
                poll_interval: Some("500ms".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        store.save(&config).await.unwrap();
        assert_eq!(store.load().await.unwrap(), config);
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let written = store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap(), written);
        assert_eq!(written.recording_limit_or_default().as_secs(), 60);

        assert!(matches!(
            store.init().await,
            Err(ConfigError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let store = XdgConfigStore::with_path(dir.path());
        assert!(matches!(store.load().await, Err(ConfigError::Io { .. })));
    }
}
