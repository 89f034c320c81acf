//! Prompt playback port interface

use async_trait::async_trait;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// No output device could be opened; the user can retry manually
    #[error("Playback blocked: {0}")]
    Blocked(String),

    #[error("Failed to fetch prompt audio: {0}")]
    FetchFailed(String),

    #[error("Failed to decode prompt audio: {0}")]
    DecodeFailed(String),
}

/// Port for prompt audio playback
#[async_trait]
pub trait PromptPlayer: Send + Sync {
    /// Start playing the audio at `url`. Returns once playback has begun.
    async fn play(&self, url: &str) -> Result<(), PlaybackError>;
}
