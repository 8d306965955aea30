//! Transcription port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioData;

/// Classified transcription failures.
///
/// Only network failures are transient; everything else fails the
/// attempt immediately.
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Authentication failed (invalid or expired token)")]
    Auth,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("API error: {0}")]
    Api(String),
}

impl TranscriptionError {
    /// Whether a retry with backoff could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// A successful transcription outcome.
///
/// Blank text is a valid outcome (the remote recognized no words) and is
/// distinct from an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True when the remote produced no usable words
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Port for cloud speech-to-text
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe audio to text.
    ///
    /// # Arguments
    /// * `audio` - The encoded audio
    /// * `language` - BCP-47 language code (e.g. "en-US")
    ///
    /// # Returns
    /// A transcript (possibly blank) or a classified error
    async fn transcribe(
        &self,
        audio: &AudioData,
        language: &str,
    ) -> Result<Transcript, TranscriptionError>;
}
