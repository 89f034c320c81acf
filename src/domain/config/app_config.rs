//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::audio::UploadFormat;
use crate::domain::interview::INTRO_TEXT;
use crate::domain::recording::Duration;

/// Default backend base URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Face presence watchdog configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    pub enabled: Option<bool>,
    pub detector_cmd: Option<String>,
    pub absence_threshold: Option<String>,
    pub poll_interval: Option<String>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: Option<String>,
    pub intro_audio_url: Option<String>,
    pub intro_text: Option<String>,
    pub recording_limit: Option<String>,
    pub upload_format: Option<String>,
    pub input_device: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub notify: Option<bool>,
    pub play_audio: Option<bool>,
    pub presence: Option<PresenceConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            intro_audio_url: None,
            intro_text: Some(INTRO_TEXT.to_string()),
            recording_limit: Some("60s".to_string()),
            upload_format: Some("wav".to_string()),
            input_device: None,
            sample_rate: None,
            channels: None,
            notify: Some(false),
            play_audio: Some(true),
            presence: Some(PresenceConfig {
                enabled: Some(false),
                detector_cmd: None,
                absence_threshold: Some("3s".to_string()),
                poll_interval: Some("300ms".to_string()),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            server_url: other.server_url.or(self.server_url),
            intro_audio_url: other.intro_audio_url.or(self.intro_audio_url),
            intro_text: other.intro_text.or(self.intro_text),
            recording_limit: other.recording_limit.or(self.recording_limit),
            upload_format: other.upload_format.or(self.upload_format),
            input_device: other.input_device.or(self.input_device),
            sample_rate: other.sample_rate.or(self.sample_rate),
            channels: other.channels.or(self.channels),
            notify: other.notify.or(self.notify),
            play_audio: other.play_audio.or(self.play_audio),
            presence: Self::merge_presence_config(self.presence, other.presence),
        }
    }

    fn merge_presence_config(
        base: Option<PresenceConfig>,
        other: Option<PresenceConfig>,
    ) -> Option<PresenceConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(PresenceConfig {
                enabled: o.enabled.or(b.enabled),
                detector_cmd: o.detector_cmd.or(b.detector_cmd),
                absence_threshold: o.absence_threshold.or(b.absence_threshold),
                poll_interval: o.poll_interval.or(b.poll_interval),
            }),
        }
    }

    /// Server base URL, trailing slashes removed
    pub fn server_url_or_default(&self) -> &str {
        self.server_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn intro_text_or_default(&self) -> &str {
        self.intro_text.as_deref().unwrap_or(INTRO_TEXT)
    }

    /// Get recording_limit as parsed Duration, or default if not set/invalid
    pub fn recording_limit_or_default(&self) -> Duration {
        self.recording_limit
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_recording_limit)
    }

    /// Get upload_format as parsed UploadFormat, or WAV if not set/invalid
    pub fn upload_format_or_default(&self) -> UploadFormat {
        self.upload_format
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }

    pub fn play_audio_or_default(&self) -> bool {
        self.play_audio.unwrap_or(true)
    }

    /// Watchdog runs only when enabled and a detector command is set
    pub fn presence_enabled_or_default(&self) -> bool {
        self.presence
            .as_ref()
            .and_then(|p| p.enabled)
            .unwrap_or(false)
    }

    pub fn detector_cmd(&self) -> Option<&str> {
        self.presence
            .as_ref()
            .and_then(|p| p.detector_cmd.as_deref())
            .filter(|cmd| !cmd.trim().is_empty())
    }

    pub fn absence_threshold_or_default(&self) -> Duration {
        self.presence
            .as_ref()
            .and_then(|p| p.absence_threshold.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_absence_threshold)
    }

    pub fn poll_interval_or_default(&self) -> Duration {
        self.presence
            .as_ref()
            .and_then(|p| p.poll_interval.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_poll_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.server_url_or_default(), DEFAULT_SERVER_URL);
        assert_eq!(config.intro_text_or_default(), "Tell Me about yourself!");
        assert_eq!(config.recording_limit_or_default().as_secs(), 60);
        assert_eq!(config.upload_format_or_default(), UploadFormat::Wav);
        assert!(config.play_audio_or_default());
        assert!(!config.presence_enabled_or_default());
        assert_eq!(config.absence_threshold_or_default().as_millis(), 3000);
        assert_eq!(config.poll_interval_or_default().as_millis(), 300);
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.server_url.is_none());
        assert!(config.recording_limit.is_none());
        assert!(config.presence.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            server_url: Some("http://base".to_string()),
            recording_limit: Some("30s".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            server_url: Some("http://other".to_string()),
            recording_limit: None,
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.server_url.as_deref(), Some("http://other"));
        assert_eq!(merged.recording_limit.as_deref(), Some("30s"));
    }

    #[test]
    fn merge_presence_config() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            presence: Some(PresenceConfig {
                enabled: Some(true),
                detector_cmd: Some("detect-faces".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = base.merge(other);
        assert!(merged.presence_enabled_or_default());
        assert_eq!(merged.detector_cmd(), Some("detect-faces"));
        assert_eq!(merged.poll_interval_or_default().as_millis(), 300);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig {
            recording_limit: Some("forever".to_string()),
            upload_format: Some("ogg".to_string()),
            presence: Some(PresenceConfig {
                absence_threshold: Some("0s".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.recording_limit_or_default().as_secs(), 60);
        assert_eq!(config.upload_format_or_default(), UploadFormat::Wav);
        assert_eq!(config.absence_threshold_or_default().as_millis(), 3000);
    }

    #[test]
    fn server_url_trims_trailing_slash() {
        let config = AppConfig {
            server_url: Some("https://interviews.example/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.server_url_or_default(), "https://interviews.example");
    }

    #[test]
    fn blank_detector_cmd_is_none() {
        let config = AppConfig {
            presence: Some(PresenceConfig {
                detector_cmd: Some("  ".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(config.detector_cmd(), None);
    }

    #[test]
    fn toml_roundtrip_keeps_presence_table() {
        let text = r#"
server_url = "http://localhost:9000"
recording_limit = "45s"

[presence]
enabled = true
poll_interval = "500ms"
"#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.recording_limit_or_default().as_secs(), 45);
        assert!(config.presence_enabled_or_default());
        assert_eq!(config.poll_interval_or_default().as_millis(), 500);
    }
}
