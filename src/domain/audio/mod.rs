//! Audio domain module: decoded samples and upload containers

mod audio_data;
mod decoded;
pub mod wav;

pub use audio_data::{AudioData, UploadFormat};
pub use decoded::DecodedAudio;
pub use wav::{encode_wav, quantize, WavContainer, WAV_HEADER_LEN};
