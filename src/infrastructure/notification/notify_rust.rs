//! Desktop notices through notify-rust

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use super::APP_NAME;
use crate::application::ports::{Notice, NoticeKind, NotificationError, Notifier};

/// Notices that need attention stay up this long
const ATTENTION_TIMEOUT_MS: u32 = 10_000;

pub struct NotifyRustNotifier {
    app_name: &'static str,
}

impl NotifyRustNotifier {
    pub fn new() -> Self {
        Self { app_name: APP_NAME }
    }

    fn build(&self, notice: &Notice) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(self.app_name)
            .summary(&notice.summary)
            .body(&notice.body)
            .icon(notice.kind.icon_name())
            .timeout(timeout_for(notice.kind));
        notification
    }
}

impl Default for NotifyRustNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn timeout_for(kind: NoticeKind) -> Timeout {
    if kind.needs_attention() {
        Timeout::Milliseconds(ATTENTION_TIMEOUT_MS)
    } else {
        Timeout::Default
    }
}

#[async_trait]
impl Notifier for NotifyRustNotifier {
    async fn notify(&self, notice: &Notice) -> Result<(), NotificationError> {
        let notification = self.build(notice);

        // show() talks to the session bus and blocks
        tokio::task::spawn_blocking(move || notification.show().map(drop))
            .await
            .map_err(|e| NotificationError(format!("notification task failed: {e}")))?
            .map_err(|e| NotificationError(e.to_string()))
    }
}
