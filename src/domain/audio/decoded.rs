//! Decoded multi-channel audio

use std::time::Duration as StdDuration;

/// Per-channel float samples at a fixed sample rate. Immutable.
///
/// Construction enforces the shape the encoders rely on: at least one
/// channel, all channels of equal length. Violations panic.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        assert!(!channels.is_empty(), "decoded audio needs at least one channel");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "all channels must have the same length"
        );
        assert!(
            channels.len() <= u16::MAX as usize,
            "channel count does not fit the container"
        );
        Self {
            channels,
            sample_rate,
        }
    }

    /// Split interleaved samples into channels; a trailing partial frame is dropped.
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        assert!(channel_count > 0, "decoded audio needs at least one channel");
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(channels, sample_rate)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn duration(&self) -> StdDuration {
        if self.sample_rate == 0 {
            return StdDuration::ZERO;
        }
        StdDuration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Average all channels into one
    pub fn downmix_to_mono(&self) -> Vec<f32> {
        if self.num_channels() == 1 {
            return self.channels[0].clone();
        }
        let count = self.num_channels() as f32;
        (0..self.frame_count())
            .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() / count)
            .collect()
    }
}
