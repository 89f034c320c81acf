//! Interview backend port interfaces

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioData;
use crate::domain::interview::{ExchangeReply, SessionId};

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse server response: {0}")]
    ParseError(String),
}

/// Result request errors
#[derive(Debug, Clone, Error)]
pub enum ResultError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse server response: {0}")]
    ParseError(String),

    #[error("Redirect URL not received")]
    MissingRedirect,
}

/// Port for answer uploads
#[async_trait]
pub trait UploadPort: Send + Sync {
    /// Establish the server-side session before the first upload.
    async fn open_session(&self) -> Result<(), UploadError> {
        Ok(())
    }

    /// Upload one recorded answer and return the next prompt
    async fn upload(&self, audio: &AudioData) -> Result<ExchangeReply, UploadError>;
}

/// Port for the final result request
#[async_trait]
pub trait ResultPort: Send + Sync {
    /// Ask for the interview result and return the absolute redirect URL
    async fn fetch_result(&self, session_id: Option<&SessionId>) -> Result<String, ResultError>;
}
