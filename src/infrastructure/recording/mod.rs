//! Recording infrastructure module
//!
//! Microphone capture through cpal and the FLAC upload encoder.

mod cpal_microphone;
mod flac_encoder;

pub use cpal_microphone::CpalMicrophone;
pub use flac_encoder::{encode_to_flac, FlacEncoder, TARGET_SAMPLE_RATE};
