//! Capture device port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::recording::{CaptureFormat, InvalidCaptureTransition, RawAudioChunk};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone unavailable: {0}")]
    Device(String),

    #[error("No audio data recorded")]
    EmptyCapture,

    #[error(transparent)]
    InvalidState(#[from] InvalidCaptureTransition),
}

/// Messages from the device thread into the capture session
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Buffered samples
    Chunk(RawAudioChunk),
    /// The last chunk after a flush request has been delivered
    Flushed,
    /// The stream broke
    Failed(String),
}

pub type DeviceEventSender = UnboundedSender<DeviceEvent>;

/// What to ask of the input device. `None` leaves the choice to the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub device_name: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

/// An open input stream.
///
/// `release` consumes the handle, so a device is released at most once.
pub trait DeviceHandle: Send {
    /// Format fixed when the stream opened
    fn format(&self) -> CaptureFormat;

    /// Stop feeding new audio, deliver what is buffered, then send `Flushed`
    fn request_flush(&mut self) -> Result<(), CaptureError>;

    /// Stop the stream and give the device back
    fn release(self: Box<Self>);
}

/// Port for microphone access
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Open an input stream that reports into `sink`.
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: DeviceEventSender,
    ) -> Result<Box<dyn DeviceHandle>, CaptureError>;

    /// Names of the available input devices
    fn list_input_devices(&self) -> Result<Vec<String>, CaptureError>;
}
