//! Capture memo use case
//!
//! Orchestrates one capture: preflight → location fix (bounded wait,
//! last-known fallback) → spoken announcement → fixed-duration recording
//! → file write → row insertion. The row only exists once the audio file
//! has been durably written; any earlier failure leaves no trace.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::domain::memo::{memo_filename, Duration, GeoFix, NewRecording, Recording};
use crate::storage::{RecordingStore, StoreError};

use super::ports::{
    Announcer, AudioRecorder, LocationError, LocationSource, ProgressCallback, RecordingError,
};

/// Errors from the capture use case
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Data directory not usable: {0}")]
    DataDir(String),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("Failed to write audio file: {0}")]
    WriteAudio(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input parameters for one capture
#[derive(Debug, Clone)]
pub struct CaptureInput {
    /// Recording duration
    pub duration: Duration,
    /// Skip the location source entirely and use this fix
    pub manual_fix: Option<GeoFix>,
    /// How long to wait for a fresh fix before falling back
    pub fix_wait: StdDuration,
    /// Whether to announce fix acquisition via speech synthesis
    pub announce: bool,
}

/// Callbacks for progress and status updates
#[derive(Default)]
pub struct CaptureCallbacks {
    /// Called during recording with (elapsed_ms, total_ms)
    pub on_progress: Option<ProgressCallback>,
    /// Called once a fix is chosen; the bool marks a last-known fallback
    pub on_fix: Option<Box<dyn Fn(&GeoFix, bool) + Send + Sync>>,
    /// Called when recording starts
    pub on_recording_start: Option<Box<dyn Fn() + Send + Sync>>,
    /// Called when recording ends, with the encoded size
    pub on_recording_end: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

/// One-shot capture use case
pub struct CaptureMemoUseCase<R, L, A>
where
    R: AudioRecorder,
    L: LocationSource,
    A: Announcer,
{
    recorder: R,
    locator: L,
    announcer: A,
    store: RecordingStore,
    data_dir: PathBuf,
}

impl<R, L, A> CaptureMemoUseCase<R, L, A>
where
    R: AudioRecorder,
    L: LocationSource,
    A: Announcer,
{
    pub fn new(
        recorder: R,
        locator: L,
        announcer: A,
        store: RecordingStore,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            recorder,
            locator,
            announcer,
            store,
            data_dir: data_dir.into(),
        }
    }

    /// Execute the capture workflow
    pub async fn execute(
        &self,
        input: CaptureInput,
        callbacks: CaptureCallbacks,
    ) -> Result<Recording, CaptureError> {
        // Preflight: the data directory must exist and be writable
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| CaptureError::DataDir(e.to_string()))?;

        // Location fix, falling back to the last-known fix on timeout
        let (fix, from_cache) = self.resolve_fix(&input).await?;

        if let Some(ref cb) = callbacks.on_fix {
            cb(&fix, from_cache);
        }

        // Announce acquisition; failures here never abort the capture
        if input.announce {
            if let Err(e) = self.announcer.announce("Location acquired").await {
                tracing::warn!(error = %e, "announcement failed");
            }
        }

        if let Some(ref cb) = callbacks.on_recording_start {
            cb();
        }

        let audio = self
            .recorder
            .record(input.duration, callbacks.on_progress)
            .await?;

        if let Some(ref cb) = callbacks.on_recording_end {
            cb(&audio.human_readable_size());
        }

        // Write the audio file durably before the row exists
        let captured_at = Utc::now();
        let filename = memo_filename(captured_at, fix, audio.codec().extension());
        let path = self.data_dir.join(&filename);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| CaptureError::WriteAudio(e.to_string()))?;
        file.write_all(audio.data())
            .await
            .map_err(|e| CaptureError::WriteAudio(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| CaptureError::WriteAudio(e.to_string()))?;

        let recording = self
            .store
            .insert(NewRecording {
                audio_path: path.to_string_lossy().into_owned(),
                latitude: fix.latitude,
                longitude: fix.longitude,
                captured_at: captured_at.timestamp(),
            })
            .await?;

        tracing::info!(id = recording.id, file = %filename, "memo captured");

        Ok(recording)
    }

    async fn resolve_fix(&self, input: &CaptureInput) -> Result<(GeoFix, bool), CaptureError> {
        if let Some(fix) = input.manual_fix {
            return Ok((fix, false));
        }

        match self.locator.current_fix(input.fix_wait).await {
            Ok(fix) => Ok((fix, false)),
            Err(LocationError::Timeout(_)) => {
                tracing::debug!("fix wait elapsed, trying last-known fix");
                let fix = self
                    .locator
                    .last_known()
                    .await
                    .ok_or(LocationError::NoFix)?;
                Ok((fix, true))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{AudioCodec, AudioData};
    use crate::domain::memo::MemoStatus;
    use async_trait::async_trait;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    use super::super::ports::AnnounceError;

    struct MockRecorder;

    #[async_trait]
    impl AudioRecorder for MockRecorder {
        async fn record(
            &self,
            _duration: Duration,
            _on_progress: Option<ProgressCallback>,
        ) -> Result<AudioData, RecordingError> {
            Ok(AudioData::new(vec![0u8; 64], AudioCodec::Flac))
        }
    }

    struct FixedLocator {
        current: Option<GeoFix>,
        cached: Option<GeoFix>,
    }

    #[async_trait]
    impl LocationSource for FixedLocator {
        async fn current_fix(&self, timeout: StdDuration) -> Result<GeoFix, LocationError> {
            self.current.ok_or(LocationError::Timeout(timeout))
        }

        async fn last_known(&self) -> Option<GeoFix> {
            self.cached
        }
    }

    struct SilentAnnouncer;

    #[async_trait]
    impl Announcer for SilentAnnouncer {
        async fn announce(&self, _text: &str) -> Result<(), AnnounceError> {
            Ok(())
        }
    }

    struct BrokenAnnouncer;

    #[async_trait]
    impl Announcer for BrokenAnnouncer {
        async fn announce(&self, _text: &str) -> Result<(), AnnounceError> {
            Err(AnnounceError::NoSynthAvailable)
        }
    }

    fn input_with_fix(fix: GeoFix) -> CaptureInput {
        CaptureInput {
            duration: Duration::from_secs(1),
            manual_fix: Some(fix),
            fix_wait: StdDuration::from_secs(1),
            announce: false,
        }
    }

    #[tokio::test]
    async fn capture_writes_file_then_row() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::open_in_memory().await.unwrap();
        let use_case = CaptureMemoUseCase::new(
            MockRecorder,
            FixedLocator {
                current: None,
                cached: None,
            },
            SilentAnnouncer,
            store.clone(),
            dir.path(),
        );

        let fix = GeoFix::new(37.7749, -122.4194);
        let rec = use_case
            .execute(input_with_fix(fix), CaptureCallbacks::default())
            .await
            .unwrap();

        assert_eq!(rec.status, MemoStatus::NotStarted);
        assert!(std::path::Path::new(&rec.audio_path).exists());
        assert!(rec.audio_path.contains("VN_"));
        assert!(rec.audio_path.ends_with(".flac"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn timeout_falls_back_to_last_known() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::open_in_memory().await.unwrap();
        let cached = GeoFix::new(48.1374, 11.5755);
        let use_case = CaptureMemoUseCase::new(
            MockRecorder,
            FixedLocator {
                current: None,
                cached: Some(cached),
            },
            SilentAnnouncer,
            store.clone(),
            dir.path(),
        );

        let input = CaptureInput {
            duration: Duration::from_secs(1),
            manual_fix: None,
            fix_wait: StdDuration::from_millis(10),
            announce: false,
        };
        let rec = use_case
            .execute(input, CaptureCallbacks::default())
            .await
            .unwrap();

        assert_eq!(rec.latitude, cached.latitude);
        assert_eq!(rec.longitude, cached.longitude);
    }

    #[tokio::test]
    async fn no_fix_at_all_leaves_no_row() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::open_in_memory().await.unwrap();
        let use_case = CaptureMemoUseCase::new(
            MockRecorder,
            FixedLocator {
                current: None,
                cached: None,
            },
            SilentAnnouncer,
            store.clone(),
            dir.path(),
        );

        let input = CaptureInput {
            duration: Duration::from_secs(1),
            manual_fix: None,
            fix_wait: StdDuration::from_millis(10),
            announce: false,
        };
        let result = use_case.execute(input, CaptureCallbacks::default()).await;

        assert!(matches!(
            result,
            Err(CaptureError::Location(LocationError::NoFix))
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn announce_failure_is_non_fatal() {
        let dir = TempDir::new().unwrap();
        let store = RecordingStore::open_in_memory().await.unwrap();
        let use_case = CaptureMemoUseCase::new(
            MockRecorder,
            FixedLocator {
                current: Some(GeoFix::new(1.0, 2.0)),
                cached: None,
            },
            BrokenAnnouncer,
            store.clone(),
            dir.path(),
        );

        let mut input = input_with_fix(GeoFix::new(1.0, 2.0));
        input.announce = true;

        assert!(use_case
            .execute(input, CaptureCallbacks::default())
            .await
            .is_ok());
    }
}
