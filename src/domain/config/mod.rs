mod app_config;

pub use app_config::{AppConfig, PresenceConfig, DEFAULT_SERVER_URL};
