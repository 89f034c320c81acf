//! FLAC upload encoder
//!
//! The compact upload format: downmixed to mono, resampled to 16kHz
//! and stored losslessly as 16-bit FLAC (~40% of the WAV size).

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use rubato::{FftFixedIn, Resampler};

use crate::application::ports::{AudioEncoder, EncodeError};
use crate::domain::audio::{quantize, AudioData, DecodedAudio, UploadFormat};

/// Target sample rate for speech-optimized encoding
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Bits per sample (16-bit audio)
const BITS_PER_SAMPLE: usize = 16;

/// Number of channels (mono)
const CHANNELS: usize = 1;

/// Resampler input block
const RESAMPLE_CHUNK: usize = 1024;

/// Encoder for `UploadFormat::Flac`
#[derive(Debug, Default, Clone, Copy)]
pub struct FlacEncoder;

impl FlacEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioEncoder for FlacEncoder {
    fn format(&self) -> UploadFormat {
        UploadFormat::Flac
    }

    fn encode(&self, audio: &DecodedAudio) -> Result<AudioData, EncodeError> {
        let mono = audio.downmix_to_mono();
        let resampled = resample_to_16k(&mono, audio.sample_rate())?;
        let pcm: Vec<i16> = resampled.into_iter().map(quantize).collect();
        let bytes = encode_to_flac(&pcm)?;
        Ok(AudioData::new(bytes, UploadFormat::Flac))
    }
}

/// Resample mono audio from the device rate to 16kHz
fn resample_to_16k(samples: &[f32], source_rate: u32) -> Result<Vec<f32>, EncodeError> {
    if source_rate == TARGET_SAMPLE_RATE || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        TARGET_SAMPLE_RATE as usize,
        RESAMPLE_CHUNK,
        2,
        CHANNELS,
    )
    .map_err(|e| EncodeError::ResampleFailed(e.to_string()))?;

    let mut output = Vec::with_capacity(output_len + RESAMPLE_CHUNK);
    let mut input_pos = 0;

    while input_pos < samples.len() {
        let frames_needed = resampler.input_frames_next();
        let end_pos = (input_pos + frames_needed).min(samples.len());

        // Pad the last block with silence
        let mut block = samples[input_pos..end_pos].to_vec();
        block.resize(frames_needed, 0.0);

        let resampled = resampler
            .process(&[block], None)
            .map_err(|e| EncodeError::ResampleFailed(e.to_string()))?;

        output.extend_from_slice(&resampled[0]);
        input_pos = end_pos;
    }

    output.truncate(output_len);
    Ok(output)
}

/// Encode mono 16kHz PCM samples to FLAC bytes
pub fn encode_to_flac(pcm_samples: &[i16]) -> Result<Vec<u8>, EncodeError> {
    // flacenc works on i32
    let samples_i32: Vec<i32> = pcm_samples.iter().map(|&s| s as i32).collect();

    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodeError::EncodeFailed(format!("config: {:?}", e)))?;

    let source = MemSource::from_samples(
        &samples_i32,
        CHANNELS,
        BITS_PER_SAMPLE,
        TARGET_SAMPLE_RATE as usize,
    );

    let flac_stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodeError::EncodeFailed(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    flac_stream
        .write(&mut sink)
        .map_err(|e| EncodeError::EncodeFailed(e.to_string()))?;

    Ok(sink.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(rate: u32, secs: f32) -> Vec<f32> {
        let n = (rate as f32 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn encode_silence_has_flac_magic() {
        let silence = vec![0i16; TARGET_SAMPLE_RATE as usize];
        let flac_data = encode_to_flac(&silence).unwrap();
        assert!(flac_data.len() > 50);
        assert_eq!(&flac_data[0..4], b"fLaC");
    }

    #[test]
    fn resample_halves_32k() {
        let input = sine(32_000, 1.0);
        let output = resample_to_16k(&input, 32_000).unwrap();
        assert_eq!(output.len(), 16_000);
    }

    #[test]
    fn resample_passthrough_at_target() {
        let input = sine(TARGET_SAMPLE_RATE, 0.1);
        assert_eq!(resample_to_16k(&input, TARGET_SAMPLE_RATE).unwrap(), input);
    }

    #[test]
    fn encoder_downmixes_stereo_44k() {
        let left = sine(44_100, 0.5);
        let right = left.clone();
        let audio = DecodedAudio::new(vec![left, right], 44_100);

        let data = FlacEncoder::new().encode(&audio).unwrap();
        assert_eq!(data.format(), UploadFormat::Flac);
        assert_eq!(&data.data()[0..4], b"fLaC");
        // Smaller than the equivalent 16-bit WAV payload
        assert!(data.size_bytes() < 44_100 * 2 * 2 / 2);
    }
}
