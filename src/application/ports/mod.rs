//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod backend;
pub mod config;
pub mod encoder;
pub mod face_detector;
pub mod microphone;
pub mod notifier;
pub mod playback;

// Re-export common types
pub use backend::{ResultError, ResultPort, UploadError, UploadPort};
pub use config::ConfigStore;
pub use encoder::{AudioEncoder, EncodeError};
pub use face_detector::{DetectionError, FaceDetector};
pub use microphone::{
    CaptureConstraints, CaptureError, DeviceEvent, DeviceEventSender, DeviceHandle, Microphone,
};
pub use notifier::{Notice, NoticeKind, NotificationError, Notifier};
pub use playback::{PlaybackError, PromptPlayer};
