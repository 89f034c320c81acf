//! Canonical 16-bit PCM WAV container
//!
//! Layout (all integers little-endian):
//!
//! | offset | field                         |
//! |--------|-------------------------------|
//! | 0      | "RIFF"                        |
//! | 4      | total size - 8 (u32)          |
//! | 8      | "WAVE"                        |
//! | 12     | "fmt "                        |
//! | 16     | 16 (u32)                      |
//! | 20     | 1 = PCM (u16)                 |
//! | 22     | channels (u16)                |
//! | 24     | sample rate (u32)             |
//! | 28     | byte rate (u32)               |
//! | 32     | block align (u16)             |
//! | 34     | 16 bits per sample (u16)      |
//! | 36     | "data"                        |
//! | 40     | payload size (u32)            |
//! | 44     | interleaved i16 samples       |

use super::audio_data::{AudioData, UploadFormat};
use super::decoded::DecodedAudio;

/// Size of the fixed header
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;
const FMT_CHUNK_LEN: u32 = 16;

/// Encoded WAV bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Vec<u8>,
}

impl WavContainer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size of the PCM payload after the header
    pub fn payload_len(&self) -> usize {
        self.bytes.len() - WAV_HEADER_LEN
    }
}

impl From<WavContainer> for AudioData {
    fn from(wav: WavContainer) -> Self {
        AudioData::new(wav.into_bytes(), UploadFormat::Wav)
    }
}

/// Map a float sample to 16-bit PCM.
///
/// Clamped to [-1, 1], negatives scaled by 32768 and positives by 32767,
/// truncated toward zero. The product is taken in f64 so it never rounds
/// up to the next step before truncation. NaN maps to 0.
pub fn quantize(sample: f32) -> i16 {
    let s = f64::from(sample).clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode decoded audio into the canonical container.
pub fn encode_wav(audio: &DecodedAudio) -> WavContainer {
    let channels = audio.num_channels();
    let frames = audio.frame_count();
    let payload_len = channels * frames * BYTES_PER_SAMPLE;
    assert!(
        payload_len <= (u32::MAX as usize) - (WAV_HEADER_LEN - 8),
        "audio too long for a WAV container"
    );

    let channel_count = channels as u16;
    let sample_rate = audio.sample_rate();
    // Header fields are fixed-width; oversized values wrap like the u32/u16 writes they feed
    let block_align = channel_count.wrapping_mul(BYTES_PER_SAMPLE as u16);
    let byte_rate = sample_rate.wrapping_mul(channels as u32 * BYTES_PER_SAMPLE as u32);

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + payload_len);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&((WAV_HEADER_LEN - 8 + payload_len) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    bytes.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    bytes.extend_from_slice(&channel_count.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(payload_len as u32).to_le_bytes());

    for i in 0..frames {
        for channel in audio.channels() {
            bytes.extend_from_slice(&quantize(channel[i]).to_le_bytes());
        }
    }

    debug_assert_eq!(bytes.len(), WAV_HEADER_LEN + payload_len);
    WavContainer { bytes }
}
