//! Rodio-based memo playback

use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    #[error("No audio output device: {0}")]
    DeviceNotAvailable(String),

    #[error("Could not decode audio: {0}")]
    DecodeFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Play an audio file to the default output device, blocking until done
pub async fn play_file(path: impl Into<PathBuf>) -> Result<(), PlaybackError> {
    let path = path.into();

    if !path.exists() {
        return Err(PlaybackError::FileNotFound(
            path.to_string_lossy().into_owned(),
        ));
    }

    // rodio's stream handle is not Send, keep playback on a blocking thread
    tokio::task::spawn_blocking(move || play_file_sync(&path))
        .await
        .map_err(|e| PlaybackError::PlaybackFailed(format!("Task join error: {}", e)))?
}

fn play_file_sync(path: &Path) -> Result<(), PlaybackError> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

    let file =
        std::fs::File::open(path).map_err(|e| PlaybackError::FileNotFound(e.to_string()))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;

    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
