//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod capture;
pub mod interview;
pub mod ports;
pub mod presence;

// Re-export use cases
pub use capture::AudioCaptureSession;
pub use interview::{
    ClickOutcome, ExchangeOutcome, InterviewConfig, InterviewController, InterviewError,
    PlaybackOutcome, ResultJob, TickOutcome, UploadJob,
};
pub use presence::{PresenceWatchdog, WatchdogHandle, ABSENCE_MESSAGE};
