//! Upload encoder port interface

use thiserror::Error;

use crate::domain::audio::{AudioData, DecodedAudio, UploadFormat};

/// Encoding errors
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("Resampling failed: {0}")]
    ResampleFailed(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Port for compact upload encodings. WAV needs none; it is built in.
pub trait AudioEncoder: Send + Sync {
    fn format(&self) -> UploadFormat;

    /// CPU bound; run it off the event loop
    fn encode(&self, audio: &DecodedAudio) -> Result<AudioData, EncodeError>;
}
