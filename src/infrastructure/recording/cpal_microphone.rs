//! Cross-platform microphone adapter using cpal
//!
//! The cpal stream is not `Send`, so each capture owns a dedicated thread
//! that builds the stream, forwards buffered samples as chunks, and obeys
//! flush/release commands.

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::ports::{
    CaptureConstraints, CaptureError, DeviceEvent, DeviceEventSender, DeviceHandle, Microphone,
};
use crate::domain::recording::{CaptureFormat, RawAudioChunk};

/// Chunks are emitted roughly this often
const CHUNK_MILLIS: u32 = 100;

enum Control {
    Flush,
    Release,
}

/// Microphone backed by the default cpal host
#[derive(Debug, Default)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }

    /// Find the requested input device, or the default one
    fn select_device(name: Option<&str>) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();

        let Some(wanted) = name else {
            return host
                .default_input_device()
                .ok_or_else(|| CaptureError::Device("no input device available".into()));
        };

        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        for device in devices {
            if device.name().is_ok_and(|n| n == wanted) {
                return Ok(device);
            }
        }
        Err(CaptureError::Device(format!("input device not found: {wanted}")))
    }

    /// Pick a stream configuration honouring the constraints
    fn select_config(
        device: &cpal::Device,
        constraints: &CaptureConstraints,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        if constraints.sample_rate.is_none() && constraints.channels.is_none() {
            let default = device
                .default_input_config()
                .map_err(|e| CaptureError::Device(format!("Failed to get config: {e}")))?;
            if format_rank(default.sample_format()).is_some() {
                return Ok((default.config(), default.sample_format()));
            }
            debug!(
                format = ?default.sample_format(),
                "default input format unsupported, searching device configs"
            );
        }

        let supported = device
            .supported_input_configs()
            .map_err(|e| CaptureError::Device(format!("Failed to get configs: {e}")))?;

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for range in supported {
            let Some(rank) = format_rank(range.sample_format()) else {
                continue;
            };
            if constraints.channels.is_some_and(|c| c != range.channels()) {
                continue;
            }
            if let Some(rate) = constraints.sample_rate {
                if rate < range.min_sample_rate().0 || rate > range.max_sample_rate().0 {
                    continue;
                }
            }
            let is_better = best
                .as_ref()
                .and_then(|current| format_rank(current.sample_format()))
                .map_or(true, |current| rank < current);
            if is_better {
                best = Some(range);
            }
        }

        let range = best.ok_or_else(|| {
            CaptureError::Device("no input configuration matches the requested format".into())
        })?;

        let sample_rate = constraints
            .sample_rate
            .map(SampleRate)
            .unwrap_or_else(|| range.max_sample_rate());
        let sample_format = range.sample_format();
        let config = StreamConfig {
            channels: range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        Ok((config, sample_format))
    }

    /// Body of the capture thread
    fn run_stream(
        constraints: CaptureConstraints,
        sink: DeviceEventSender,
        control: std_mpsc::Receiver<Control>,
        ready: oneshot::Sender<Result<CaptureFormat, CaptureError>>,
    ) {
        let opened = Self::select_device(constraints.device_name.as_deref()).and_then(|device| {
            let (config, sample_format) = Self::select_config(&device, &constraints)?;
            let format = CaptureFormat::new(config.sample_rate.0, config.channels);
            let buffer = ChunkBuffer::new(format, sink.clone());
            let stream = build_stream(&device, &config, sample_format, buffer.clone(), sink.clone())?;
            stream
                .play()
                .map_err(|e| CaptureError::Device(e.to_string()))?;
            Ok((stream, buffer, format))
        });

        let (stream, buffer, format) = match opened {
            Ok(parts) => parts,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        if ready.send(Ok(format)).is_err() {
            return;
        }

        while let Ok(command) = control.recv() {
            match command {
                Control::Flush => buffer.flush(),
                Control::Release => break,
            }
        }

        drop(stream);
        debug!("capture stream closed");
    }
}

/// Samples accumulated between chunk sends, shared with the cpal callback
#[derive(Clone)]
struct ChunkBuffer {
    inner: Arc<StdMutex<PendingSamples>>,
    sink: DeviceEventSender,
    chunk_len: usize,
}

struct PendingSamples {
    samples: Vec<f32>,
    active: bool,
}

impl ChunkBuffer {
    fn new(format: CaptureFormat, sink: DeviceEventSender) -> Self {
        let chunk_len =
            (format.sample_rate * CHUNK_MILLIS / 1000) as usize * format.channels as usize;
        Self {
            inner: Arc::new(StdMutex::new(PendingSamples {
                samples: Vec::with_capacity(chunk_len),
                active: true,
            })),
            sink,
            chunk_len: chunk_len.max(1),
        }
    }

    /// Called from the audio callback
    fn push(&self, data: impl Iterator<Item = f32>) {
        let Ok(mut pending) = self.inner.lock() else {
            return;
        };
        if !pending.active {
            return;
        }
        pending.samples.extend(data);
        if pending.samples.len() >= self.chunk_len {
            let samples = std::mem::replace(&mut pending.samples, Vec::with_capacity(self.chunk_len));
            let _ = self.sink.send(DeviceEvent::Chunk(RawAudioChunk::new(samples)));
        }
    }

    /// Stop accepting audio, send the remainder, then `Flushed`
    fn flush(&self) {
        let rest = match self.inner.lock() {
            Ok(mut pending) => {
                pending.active = false;
                std::mem::take(&mut pending.samples)
            }
            Err(_) => Vec::new(),
        };
        if !rest.is_empty() {
            let _ = self.sink.send(DeviceEvent::Chunk(RawAudioChunk::new(rest)));
        }
        let _ = self.sink.send(DeviceEvent::Flushed);
    }
}

/// Preference among the sample formats the stream can convert, lower is
/// better. `None` for formats the adapter cannot read.
fn format_rank(format: SampleFormat) -> Option<u8> {
    match format {
        SampleFormat::F32 => Some(0),
        SampleFormat::I16 => Some(1),
        SampleFormat::U16 => Some(2),
        _ => None,
    }
}

fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Unsigned samples are centred on 32768
fn u16_to_f32(sample: u16) -> f32 {
    (sample as f32 - 32768.0) / 32768.0
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    buffer: ChunkBuffer,
    sink: DeviceEventSender,
) -> Result<cpal::Stream, CaptureError> {
    let on_error = move |err: cpal::StreamError| {
        warn!(error = %err, "audio stream error");
        let _ = sink.send(DeviceEvent::Failed(err.to_string()));
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                buffer.push(data.iter().copied().map(i16_to_f32));
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                buffer.push(data.iter().copied().map(u16_to_f32));
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                buffer.push(data.iter().copied());
            },
            on_error,
            None,
        ),
        other => {
            return Err(CaptureError::Device(format!(
                "Unsupported sample format: {other:?}"
            )))
        }
    };

    stream.map_err(|e| CaptureError::Device(e.to_string()))
}

/// Handle to a running cpal capture thread
struct CpalDeviceHandle {
    format: CaptureFormat,
    control: std_mpsc::Sender<Control>,
    thread: Option<JoinHandle<()>>,
}

impl DeviceHandle for CpalDeviceHandle {
    fn format(&self) -> CaptureFormat {
        self.format
    }

    fn request_flush(&mut self) -> Result<(), CaptureError> {
        self.control
            .send(Control::Flush)
            .map_err(|_| CaptureError::Device("capture thread stopped".into()))
    }

    fn release(mut self: Box<Self>) {
        let _ = self.control.send(Control::Release);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("capture thread panicked");
            }
        }
    }
}

#[async_trait]
impl Microphone for CpalMicrophone {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: DeviceEventSender,
    ) -> Result<Box<dyn DeviceHandle>, CaptureError> {
        let (control_tx, control_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let constraints = constraints.clone();

        let thread = std::thread::Builder::new()
            .name("capture".into())
            .spawn(move || CpalMicrophone::run_stream(constraints, sink, control_rx, ready_tx))
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        let format = match ready_rx.await {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                return Err(CaptureError::Device("capture thread exited".into()));
            }
        };

        debug!(?format, "microphone opened");
        Ok(Box::new(CpalDeviceHandle {
            format,
            control: control_tx,
            thread: Some(thread),
        }))
    }

    fn list_input_devices(&self) -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }
}
