//! Upload payload: encoded answer bytes tagged with their container

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidUploadFormatError;

/// Container used for an uploaded answer.
///
/// `Flac` is the compact option and falls back to `Wav` when encoding fails;
/// `Wav` is always the canonical 16-bit PCM container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UploadFormat {
    #[default]
    Wav,
    Flac,
}

impl UploadFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }

    /// MIME type of the multipart part
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
        }
    }
}

impl fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadFormat {
    type Err = InvalidUploadFormatError;

    /// Accepts the short name or the MIME type, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("audio/").unwrap_or(&name);
        match name {
            "wav" | "x-wav" | "wave" => Ok(Self::Wav),
            "flac" | "x-flac" => Ok(Self::Flac),
            _ => Err(InvalidUploadFormatError(s.to_string())),
        }
    }
}

/// Encoded audio ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    bytes: Vec<u8>,
    format: UploadFormat,
}

impl AudioData {
    pub fn new(bytes: Vec<u8>, format: UploadFormat) -> Self {
        Self { bytes, format }
    }

    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_data(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> UploadFormat {
        self.format
    }

    /// Name of the uploaded file part
    pub fn file_name(&self) -> String {
        format!("recording.{}", self.format.as_str())
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Size for log lines, e.g. `1.9 MiB`
    pub fn human_readable_size(&self) -> String {
        const UNITS: [&str; 3] = ["B", "KiB", "MiB"];

        let mut size = self.bytes.len() as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit + 1 < UNITS.len() {
            size /= 1024.0;
            unit += 1;
        }
        if unit == 0 {
            format!("{} B", self.bytes.len())
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}
