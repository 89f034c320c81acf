//! CLI argument definitions using Clap

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::application::ports::CaptureConstraints;
use crate::domain::audio::UploadFormat;
use crate::domain::recording::Duration;

/// Interview Desk - voice interview client
#[derive(Parser, Debug)]
#[command(name = "interview-desk")]
#[command(version)]
#[command(about = "Voice interview client: timed answers, WAV/FLAC upload and a presence watchdog")]
#[command(long_about = None)]
pub struct Cli {
    /// Interview server base URL [env: INTERVIEW_SERVER_URL]
    #[arg(short = 's', long, value_name = "URL")]
    pub server: Option<String>,

    /// Recording limit per answer (e.g., 30s, 1m, 1m30s)
    #[arg(short = 'l', long, value_name = "TIME")]
    pub limit: Option<String>,

    /// Upload format
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FormatArg>,

    /// Input device name (see `interview-desk devices`)
    #[arg(short = 'd', long, value_name = "NAME")]
    pub device: Option<String>,

    /// URL of the intro question audio
    #[arg(long, value_name = "URL")]
    pub intro_audio: Option<String>,

    /// Enable the face presence watchdog
    #[arg(short = 'w', long)]
    pub watchdog: bool,

    /// Face detector command; prints a JSON array of regions per run
    #[arg(long, value_name = "CMD")]
    pub detector_cmd: Option<String>,

    /// Do not play prompt audio
    #[arg(long)]
    pub no_audio: bool,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List audio input devices
    Devices,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Upload format argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Wav,
    Flac,
}

impl From<FormatArg> for UploadFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Wav => UploadFormat::Wav,
            FormatArg::Flac => UploadFormat::Flac,
        }
    }
}

/// Presence watchdog settings, present only when the watchdog can run
#[derive(Debug, Clone)]
pub struct WatchdogOptions {
    pub detector_cmd: String,
    pub absence_threshold: Duration,
    pub poll_interval: Duration,
}

/// Parsed interview options
#[derive(Debug, Clone)]
pub struct InterviewOptions {
    pub server_url: String,
    pub intro_text: String,
    pub intro_audio_url: Option<String>,
    pub recording_limit: Duration,
    pub upload_format: UploadFormat,
    pub constraints: CaptureConstraints,
    pub play_audio: bool,
    pub notify: bool,
    pub watchdog: Option<WatchdogOptions>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server_url",
    "intro_audio_url",
    "intro_text",
    "recording_limit",
    "upload_format",
    "input_device",
    "sample_rate",
    "channels",
    "notify",
    "play_audio",
    "presence.enabled",
    "presence.detector_cmd",
    "presence.absence_threshold",
    "presence.poll_interval",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
