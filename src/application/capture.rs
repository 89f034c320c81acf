//! Audio capture session: the capture state machine plus device ownership

use std::time::Duration as StdDuration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, warn};

use crate::domain::clock::Timestamp;
use crate::domain::recording::{
    CaptureFormat, CaptureSession, CaptureState, CapturedAudio, Countdown,
    InvalidCaptureTransition,
};

use super::ports::{CaptureConstraints, CaptureError, DeviceEvent, DeviceHandle, Microphone};

/// One recording, from device acquisition to `Stopped`.
///
/// The microphone is owned exclusively by this session and released exactly
/// once: when the flush completes, on abort, on a device error, or on drop.
pub struct AudioCaptureSession {
    session: CaptureSession,
    device: Option<Box<dyn DeviceHandle>>,
    events: Option<UnboundedReceiver<DeviceEvent>>,
}

impl Default for AudioCaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCaptureSession {
    pub fn new() -> Self {
        Self {
            session: CaptureSession::new(),
            device: None,
            events: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn format(&self) -> Option<CaptureFormat> {
        self.session.format()
    }

    /// Whether a device is currently held
    pub fn holds_device(&self) -> bool {
        self.device.is_some()
    }

    /// Acquire the microphone and start recording with a deadline.
    pub async fn start<M>(
        &mut self,
        microphone: &M,
        constraints: &CaptureConstraints,
        limit: StdDuration,
        now: Timestamp,
    ) -> Result<CaptureFormat, CaptureError>
    where
        M: Microphone + ?Sized,
    {
        if self.session.state() != CaptureState::Idle {
            return Err(InvalidCaptureTransition {
                current_state: self.session.state(),
                action: "start",
            }
            .into());
        }

        let (sink, events) = mpsc::unbounded_channel();
        let device = microphone.open(constraints, sink).await?;
        let format = device.format();

        self.device = Some(device);
        if let Err(e) = self.session.start(format, limit, now) {
            self.release();
            return Err(e.into());
        }
        self.events = Some(events);

        debug!(
            sample_rate = format.sample_rate,
            channels = format.channels,
            limit_ms = limit.as_millis() as u64,
            "capture started"
        );
        Ok(format)
    }

    /// Wait for the next device event. Pending forever when no device is open.
    pub async fn next_event(&mut self) -> Option<DeviceEvent> {
        match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Feed a device event through the state machine.
    ///
    /// Returns the captured audio once the stop flush completes.
    pub fn handle_event(
        &mut self,
        event: DeviceEvent,
    ) -> Result<Option<CapturedAudio>, CaptureError> {
        match event {
            DeviceEvent::Chunk(chunk) => {
                if chunk.is_empty() {
                    return Ok(None);
                }
                self.session.push_chunk(chunk)?;
                Ok(None)
            }
            DeviceEvent::Flushed => {
                let finished = self.session.finish();
                self.release();
                let audio = match finished {
                    Ok(audio) => audio,
                    Err(e) => {
                        self.session.abort();
                        return Err(e.into());
                    }
                };
                if audio.is_empty() {
                    warn!("capture device delivered no audio");
                    return Err(CaptureError::EmptyCapture);
                }
                debug!(
                    chunks = audio.chunks().len(),
                    samples = audio.sample_count(),
                    "capture stopped"
                );
                Ok(Some(audio))
            }
            DeviceEvent::Failed(reason) => {
                warn!(%reason, "capture device failed");
                self.abort();
                Err(CaptureError::Device(reason))
            }
        }
    }

    /// Begin the stop: the device flushes, then `Flushed` completes it.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        self.session.begin_stop()?;

        let flushed = match self.device.as_mut() {
            Some(device) => device.request_flush(),
            None => Err(CaptureError::Device("capture device already released".into())),
        };
        if let Err(e) = flushed {
            self.abort();
            return Err(e);
        }
        Ok(())
    }

    /// Countdown for display; `expired` means the caller should stop.
    pub fn tick(&self, now: Timestamp) -> Option<Countdown> {
        self.session.countdown(now)
    }

    /// Drop all captured audio and release the device.
    pub fn abort(&mut self) {
        self.session.abort();
        self.release();
    }

    fn release(&mut self) {
        self.events = None;
        if let Some(device) = self.device.take() {
            debug!("releasing capture device");
            device.release();
        }
    }
}

impl Drop for AudioCaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
