//! Face detection port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::presence::DetectionResult;

/// Detection errors
#[derive(Debug, Clone, Error)]
pub enum DetectionError {
    #[error("Face detector unavailable: {0}")]
    Unavailable(String),

    #[error("Face detection failed: {0}")]
    Failed(String),

    #[error("Invalid detector output: {0}")]
    InvalidOutput(String),
}

/// Port for a black-box face detector over the current camera frame
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in the latest frame. An empty result means no face.
    async fn detect(&self) -> Result<DetectionResult, DetectionError>;
}
