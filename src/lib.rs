//! Interview Desk - voice interview client
//!
//! Records timed spoken answers from the microphone, uploads them to an
//! interview server and plays back the next question, while an optional
//! watchdog warns when no face is visible to the camera.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Interview and capture state machines, presence debounce, WAV encoding
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, reqwest, rodio, notify-rust, etc.)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
