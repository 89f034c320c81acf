//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod interview;
pub mod presence;
pub mod recording;

// Re-export common types
pub use audio::{AudioData, UploadFormat};
pub use clock::{InterviewClock, Timestamp};
pub use config::AppConfig;
pub use error::*;
pub use interview::{InterviewSession, InterviewState};
pub use recording::Duration;
