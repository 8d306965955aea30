//! WAV (LINEAR16) encoder
//!
//! Fallback container for environments where FLAC is not wanted. Same
//! speech-optimized settings as the FLAC path: 16kHz, mono, 16-bit.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::domain::audio::TARGET_SAMPLE_RATE;

/// Encode PCM samples to an in-memory WAV file
///
/// Input: mono i16 samples at 16kHz
/// Output: WAV bytes
pub fn encode_to_wav(pcm_samples: &[i16]) -> Result<Vec<u8>, EncodingError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| EncodingError::Write(e.to_string()))?;
        for &sample in pcm_samples {
            writer
                .write_sample(sample)
                .map_err(|e| EncodingError::Write(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| EncodingError::Write(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// WAV encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("WAV write failed: {0}")]
    Write(String),
}
