//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the interview server, audio devices and the desktop.

pub mod backend;
pub mod config;
pub mod face_detection;
pub mod notification;
pub mod playback;
pub mod recording;

// Re-export adapters
pub use backend::HttpInterviewBackend;
pub use config::XdgConfigStore;
pub use face_detection::CommandFaceDetector;
pub use notification::{create_notifier, NotifyRustNotifier};
pub use playback::RodioPromptPlayer;
pub use recording::{CpalMicrophone, FlacEncoder};
