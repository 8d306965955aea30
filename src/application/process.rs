//! Process memo use case
//!
//! Runs one recording through the speech recognizer and writes the
//! outcome back. The row is claimed first (PROCESSING), so two racing
//! transcribe attempts on the same row resolve to one worker and one
//! skip. Transient network failures are retried with exponential
//! backoff; everything else fails the row immediately.

use std::path::Path;
use std::time::Duration as StdDuration;

use thiserror::Error;

use crate::domain::audio::{AudioCodec, AudioData};
use crate::domain::memo::MemoStatus;
use crate::storage::{RecordingStore, StoreError};

use super::ports::{SpeechTranscriber, Transcript, TranscriptionError};

/// Retry behavior for transient transcription failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: StdDuration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: StdDuration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff delay after the given 1-based attempt number
    pub fn delay_for(&self, attempt: u32) -> StdDuration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, StdDuration::from_millis(500))
    }
}

/// How processing a memo ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Speech was recognized; the row holds the transcript
    Completed(String),
    /// The service returned no speech; the row holds a coordinate placeholder
    Fallback(String),
    /// Transcription failed; the row holds the error message
    Failed(String),
    /// Another worker already holds the row
    Skipped,
}

/// Errors from the process use case
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No recording with id {0}")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Transcribes one stored recording and records the outcome
pub struct ProcessMemoUseCase<T: SpeechTranscriber> {
    transcriber: T,
    store: RecordingStore,
    policy: RetryPolicy,
    language: String,
}

impl<T: SpeechTranscriber> ProcessMemoUseCase<T> {
    pub fn new(
        transcriber: T,
        store: RecordingStore,
        policy: RetryPolicy,
        language: impl Into<String>,
    ) -> Self {
        Self {
            transcriber,
            store,
            policy,
            language: language.into(),
        }
    }

    /// Process the recording with the given id.
    ///
    /// Every terminal path (success, no-speech, failure) writes status
    /// and result in one store update. Only an unknown id or a store
    /// failure surfaces as an Err.
    pub async fn execute(&self, id: i64) -> Result<ProcessOutcome, ProcessError> {
        let recording = self
            .store
            .get(id)
            .await?
            .ok_or(ProcessError::NotFound(id))?;

        if !self.store.begin_processing(id).await? {
            tracing::debug!(id, "row already processing, skipping");
            return Ok(ProcessOutcome::Skipped);
        }

        let audio = match tokio::fs::read(&recording.audio_path).await {
            Ok(bytes) => {
                let codec = Path::new(&recording.audio_path)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(AudioCodec::from_extension)
                    .unwrap_or_default();
                AudioData::new(bytes, codec)
            }
            Err(e) => {
                let message = format!("Audio file unreadable: {}", e);
                self.store
                    .finish_processing(id, MemoStatus::Error, Some(&message))
                    .await?;
                return Ok(ProcessOutcome::Failed(message));
            }
        };

        match self.transcribe_with_retry(&audio).await {
            Ok(transcript) if transcript.is_blank() => {
                // No speech recognized: not an error, mark with coordinates
                let placeholder = recording.fix().fallback_placeholder();
                self.store
                    .finish_processing(id, MemoStatus::Fallback, Some(&placeholder))
                    .await?;
                Ok(ProcessOutcome::Fallback(placeholder))
            }
            Ok(transcript) => {
                let text = transcript.into_text();
                self.store
                    .finish_processing(id, MemoStatus::Completed, Some(&text))
                    .await?;
                Ok(ProcessOutcome::Completed(text))
            }
            Err(e) => {
                let message = e.to_string();
                self.store
                    .finish_processing(id, MemoStatus::Error, Some(&message))
                    .await?;
                Ok(ProcessOutcome::Failed(message))
            }
        }
    }

    async fn transcribe_with_retry(
        &self,
        audio: &AudioData,
    ) -> Result<Transcript, TranscriptionError> {
        let mut attempt = 1u32;
        loop {
            match self.transcriber.transcribe(audio, &self.language).await {
                Ok(transcript) => return Ok(transcript),
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient transcription failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
