//! Face detection adapters

mod command;

pub use command::CommandFaceDetector;
