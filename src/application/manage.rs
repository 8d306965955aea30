//! Memo management helpers

use thiserror::Error;

use crate::storage::{RecordingStore, StoreError};

/// Errors from management operations
#[derive(Debug, Error)]
pub enum ManageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to remove audio file: {0}")]
    Io(String),
}

/// Delete a memo: remove its audio file, then its row.
///
/// A missing audio file is tolerated (the row still goes). A missing
/// row is a no-op and returns false.
pub async fn delete_memo(store: &RecordingStore, id: i64) -> Result<bool, ManageError> {
    let Some(recording) = store.get(id).await? else {
        return Ok(false);
    };

    match tokio::fs::remove_file(&recording.audio_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %recording.audio_path, "audio file already gone");
        }
        Err(e) => return Err(ManageError::Io(e.to_string())),
    }

    store.delete(id).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memo::NewRecording;
    use tempfile::TempDir;

    #[tokio::test]
    async fn delete_removes_file_and_row() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("VN_20260830_142501_1.0000_2.0000.flac");
        std::fs::write(&audio, b"audio").unwrap();

        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store
            .insert(NewRecording {
                audio_path: audio.to_string_lossy().into_owned(),
                latitude: 1.0,
                longitude: 2.0,
                captured_at: 1_793_400_301,
            })
            .await
            .unwrap();

        assert!(delete_memo(&store, rec.id).await.unwrap());
        assert!(!audio.exists());
        assert!(store.get(rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_audio_file() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store
            .insert(NewRecording {
                audio_path: "/gone/VN_20260830_142501_1.0000_2.0000.flac".to_string(),
                latitude: 1.0,
                longitude: 2.0,
                captured_at: 1_793_400_301,
            })
            .await
            .unwrap();

        assert!(delete_memo(&store, rec.id).await.unwrap());
        assert!(store.get(rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_row_is_a_no_op() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        assert!(!delete_memo(&store, 42).await.unwrap());
    }
}
