//! Desktop notification port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Failed to show notification: {0}")]
pub struct NotificationError(pub String);

/// What a notice is about. Drives the icon and how long it stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Recording,
    Completed,
    Failed,
    Absence,
}

impl NoticeKind {
    /// freedesktop icon name
    pub const fn icon_name(&self) -> &'static str {
        match self {
            Self::Recording => "audio-input-microphone",
            Self::Completed => "dialog-ok",
            Self::Failed => "dialog-error",
            Self::Absence => "avatar-default",
        }
    }

    /// Notices the candidate has to act on
    pub const fn needs_attention(&self) -> bool {
        matches!(self, Self::Failed | Self::Absence)
    }
}

/// One desktop notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub summary: String,
    pub body: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, summary: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            summary: summary.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        (**self).notify(notice).await
    }
}
