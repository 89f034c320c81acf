//! Recording domain module

mod capture;
mod chunk;
mod duration;

pub use capture::{CaptureSession, CaptureState, Countdown, InvalidCaptureTransition};
pub use chunk::{CaptureFormat, CapturedAudio, RawAudioChunk};
pub use duration::{
    Duration, DEFAULT_ABSENCE_THRESHOLD_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RECORDING_LIMIT_SECS,
};
