//! Desktop notifications

mod notify_rust;

pub use self::notify_rust::NotifyRustNotifier;

use crate::application::ports::Notifier;

/// Application name shown on notices
pub const APP_NAME: &str = "Interview Desk";

pub fn create_notifier() -> Box<dyn Notifier> {
    Box::new(NotifyRustNotifier::new())
}
