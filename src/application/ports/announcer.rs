//! Speech announcement port interface

use async_trait::async_trait;
use thiserror::Error;

/// Announcement errors
#[derive(Debug, Clone, Error)]
pub enum AnnounceError {
    #[error("No speech synthesizer available")]
    NoSynthAvailable,

    #[error("Speech synthesis failed: {0}")]
    SynthFailed(String),
}

/// Port for spoken feedback during capture.
/// Failures are always non-fatal to the capture flow.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Speak a short phrase.
    async fn announce(&self, text: &str) -> Result<(), AnnounceError>;
}

#[async_trait]
impl Announcer for Box<dyn Announcer> {
    async fn announce(&self, text: &str) -> Result<(), AnnounceError> {
        (**self).announce(text).await
    }
}
