//! Raw captured audio

use std::time::Duration as StdDuration;

use crate::domain::audio::DecodedAudio;

/// Sample layout fixed by the capture device when the stream opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl CaptureFormat {
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

/// One block of interleaved samples as delivered by the device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawAudioChunk {
    samples: Vec<f32>,
}

impl RawAudioChunk {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f32>> for RawAudioChunk {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

/// Everything a finished capture produced. Immutable once handed out.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    format: CaptureFormat,
    chunks: Vec<RawAudioChunk>,
}

impl CapturedAudio {
    pub fn new(format: CaptureFormat, chunks: Vec<RawAudioChunk>) -> Self {
        Self { format, chunks }
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }

    pub fn chunks(&self) -> &[RawAudioChunk] {
        &self.chunks
    }

    /// Total interleaved samples across all chunks
    pub fn sample_count(&self) -> usize {
        self.chunks.iter().map(RawAudioChunk::len).sum()
    }

    /// Complete frames; a trailing partial frame is not counted
    pub fn frame_count(&self) -> usize {
        self.sample_count() / self.format.channels.max(1) as usize
    }

    /// True when the device delivered no complete frame
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Approximate captured duration
    pub fn duration(&self) -> StdDuration {
        let frames = self.frame_count() as u64;
        if self.format.sample_rate == 0 {
            return StdDuration::ZERO;
        }
        StdDuration::from_millis(frames * 1000 / self.format.sample_rate as u64)
    }

    /// Concatenate the chunks and split them into per-channel sample arrays.
    pub fn decode(&self) -> DecodedAudio {
        let mut interleaved = Vec::with_capacity(self.sample_count());
        for chunk in &self.chunks {
            interleaved.extend_from_slice(chunk.samples());
        }
        DecodedAudio::from_interleaved(
            &interleaved,
            self.format.channels as usize,
            self.format.sample_rate,
        )
    }
}
