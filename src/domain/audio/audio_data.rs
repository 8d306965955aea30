//! Audio data value object

use std::fmt;
use std::str::FromStr;

/// Sample rate all captures are normalized to (speech-optimized)
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Supported capture codecs.
///
/// FLAC is the default; WAV is the fallback container for setups where
/// FLAC encoding is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioCodec {
    #[default]
    Flac,
    Wav,
}

impl AudioCodec {
    /// File extension for this codec
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }

    /// Encoding name expected by the speech API `config.encoding` field
    pub const fn api_encoding(&self) -> &'static str {
        match self {
            Self::Flac => "FLAC",
            Self::Wav => "LINEAR16",
        }
    }

    /// Guess the codec from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "flac" => Some(Self::Flac),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for AudioCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| {
            format!("unknown codec '{}'. Valid values are: flac, wav", s)
        })
    }
}

/// Encoded audio ready for persistence or transcription.
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    codec: AudioCodec,
    sample_rate_hz: u32,
}

impl AudioData {
    pub fn new(data: Vec<u8>, codec: AudioCodec) -> Self {
        Self {
            data,
            codec,
            sample_rate_hz: TARGET_SAMPLE_RATE,
        }
    }

    pub fn with_sample_rate(data: Vec<u8>, codec: AudioCodec, sample_rate_hz: u32) -> Self {
        Self {
            data,
            codec,
            sample_rate_hz,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn codec(&self) -> AudioCodec {
        self.codec
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    /// Encode the audio bytes as base64 for the speech API payload
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}
