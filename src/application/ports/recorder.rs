//! Recording port interface

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::audio::AudioData;
use crate::domain::memo::Duration;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecordingError {
    #[error("Failed to start recording: {0}")]
    StartFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Failed to read captured audio: {0}")]
    ReadFailed(String),

    #[error("No audio input device available")]
    NoAudioDevice,
}

/// Progress callback type for reporting recording progress.
/// Parameters: (elapsed_ms, total_ms)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Port for fixed-duration audio capture
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Record audio for a fixed duration.
    ///
    /// # Arguments
    /// * `duration` - How long to record
    /// * `on_progress` - Optional callback for progress updates
    ///
    /// # Returns
    /// The encoded audio or an error
    async fn record(
        &self,
        duration: Duration,
        on_progress: Option<ProgressCallback>,
    ) -> Result<AudioData, RecordingError>;
}
