//! Config command handler

use reqwest::Url;

use crate::application::ports::ConfigStore;
use crate::domain::audio::UploadFormat;
use crate::domain::config::{AppConfig, PresenceConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let defaults = store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.location().display()
    ));
    if let Some(url) = defaults.server_url.as_deref() {
        presenter.info(&format!("Interview server: {}", url));
    }
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = read_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.location().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    ))
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::invalid_value(key, message)
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "server_url" => {
            let url = Url::parse(value).map_err(|e| invalid(key, e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(invalid(key, "URL must use http or https"));
            }
        }
        "recording_limit" | "presence.absence_threshold" | "presence.poll_interval" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "upload_format" => {
            value
                .parse::<UploadFormat>()
                .map_err(|e| invalid(key, e.to_string()))?;
        }
        "sample_rate" => {
            let rate = value
                .parse::<u32>()
                .map_err(|_| invalid(key, "Value must be a positive integer (Hz)"))?;
            if !(8_000..=192_000).contains(&rate) {
                return Err(invalid(key, "Sample rate must be between 8000 and 192000"));
            }
        }
        "channels" => {
            let channels = value
                .parse::<u16>()
                .map_err(|_| invalid(key, "Value must be a positive integer"))?;
            if channels == 0 || channels > 8 {
                return Err(invalid(key, "Channels must be between 1 and 8"));
            }
        }
        "notify" | "play_audio" | "presence.enabled" => {
            parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?;
        }
        "intro_text" | "presence.detector_cmd" | "input_device" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Value must not be empty"));
            }
        }
        _ => {} // intro_audio_url may be relative to the server
    }
    Ok(())
}

fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let as_bool = || parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"));

    match key {
        "server_url" => config.server_url = Some(value.to_string()),
        "intro_audio_url" => config.intro_audio_url = Some(value.to_string()),
        "intro_text" => config.intro_text = Some(value.to_string()),
        "recording_limit" => config.recording_limit = Some(value.to_string()),
        "upload_format" => config.upload_format = Some(value.to_lowercase()),
        "input_device" => config.input_device = Some(value.to_string()),
        "sample_rate" => {
            config.sample_rate = Some(value.parse().map_err(|_| invalid(key, "Invalid number"))?)
        }
        "channels" => {
            config.channels = Some(value.parse().map_err(|_| invalid(key, "Invalid number"))?)
        }
        "notify" => config.notify = Some(as_bool()?),
        "play_audio" => config.play_audio = Some(as_bool()?),
        "presence.enabled" => presence_mut(config).enabled = Some(as_bool()?),
        "presence.detector_cmd" => presence_mut(config).detector_cmd = Some(value.to_string()),
        "presence.absence_threshold" => {
            presence_mut(config).absence_threshold = Some(value.to_string())
        }
        "presence.poll_interval" => presence_mut(config).poll_interval = Some(value.to_string()),
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn presence_mut(config: &mut AppConfig) -> &mut PresenceConfig {
    config.presence.get_or_insert_with(PresenceConfig::default)
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    let presence = config.presence.as_ref();
    match key {
        "server_url" => config.server_url.clone(),
        "intro_audio_url" => config.intro_audio_url.clone(),
        "intro_text" => config.intro_text.clone(),
        "recording_limit" => config.recording_limit.clone(),
        "upload_format" => config.upload_format.clone(),
        "input_device" => config.input_device.clone(),
        "sample_rate" => config.sample_rate.map(|v| v.to_string()),
        "channels" => config.channels.map(|v| v.to_string()),
        "notify" => config.notify.map(|b| b.to_string()),
        "play_audio" => config.play_audio.map(|b| b.to_string()),
        "presence.enabled" => presence.and_then(|p| p.enabled).map(|b| b.to_string()),
        "presence.detector_cmd" => presence.and_then(|p| p.detector_cmd.clone()),
        "presence.absence_threshold" => presence.and_then(|p| p.absence_threshold.clone()),
        "presence.poll_interval" => presence.and_then(|p| p.poll_interval.clone()),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
