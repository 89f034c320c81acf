//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, keyboard and signal
//! input, and the interactive interview runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod devices_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{run_interview, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, InterviewOptions, WatchdogOptions};
pub use presenter::Presenter;
