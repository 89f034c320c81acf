//! Face presence domain module

mod detection;
mod monitor;

pub use detection::{DetectionResult, FaceRegion};
pub use monitor::{FacePresenceMonitor, PresenceNotification, PresenceState};
