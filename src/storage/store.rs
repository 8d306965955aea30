//! Recording store over a single SQLite table
//!
//! The store is an explicitly constructed handle passed into the flows
//! that need it (no global accessor). Status and result are always
//! written together in a single UPDATE, and every mutation bumps a
//! `watch`-based revision counter that observers can subscribe to.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::error::StatusDecodeError;
use crate::domain::memo::{MemoStatus, NewRecording, Recording};

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Decode(#[from] StatusDecodeError),
}

/// Handle to the `recordings` table.
///
/// Cheap to clone; all clones share the pool and the change feed.
#[derive(Clone)]
pub struct RecordingStore {
    pool: SqlitePool,
    changes: Arc<watch::Sender<u64>>,
}

impl RecordingStore {
    /// Open (or create) the store at the given file path.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Open an in-memory store. Used by tests.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        // A single connection keeps every query on the same in-memory DB
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recordings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                audio_path TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                captured_at INTEGER NOT NULL,
                status TEXT NOT NULL,
                result TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        let (changes, _) = watch::channel(0u64);

        Ok(Self {
            pool,
            changes: Arc::new(changes),
        })
    }

    /// Insert a freshly captured memo. The row starts in `NotStarted`
    /// with no result.
    pub async fn insert(&self, new: NewRecording) -> Result<Recording, StoreError> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO recordings
                (audio_path, latitude, longitude, captured_at, status, result, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&new.audio_path)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(new.captured_at)
        .bind(MemoStatus::NotStarted.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.notify();

        Ok(Recording {
            id: result.last_insert_rowid(),
            audio_path: new.audio_path,
            latitude: new.latitude,
            longitude: new.longitude,
            captured_at: new.captured_at,
            status: MemoStatus::NotStarted,
            result: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch one row by id.
    pub async fn get(&self, id: i64) -> Result<Option<Recording>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, audio_path, latitude, longitude, captured_at, status, result, created_at, updated_at
            FROM recordings
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_recording(&r)).transpose()
    }

    /// List all rows, newest capture first.
    pub async fn list(&self) -> Result<Vec<Recording>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, audio_path, latitude, longitude, captured_at, status, result, created_at, updated_at
            FROM recordings
            ORDER BY captured_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_recording).collect()
    }

    /// Claim a row for processing.
    ///
    /// Clears any prior error/fallback marker and moves the row to
    /// PROCESSING in one conditional statement. Returns false when the
    /// row is already PROCESSING (or does not exist), making concurrent
    /// transcribe attempts on the same row a no-op for the loser.
    pub async fn begin_processing(&self, id: i64) -> Result<bool, StoreError> {
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            UPDATE recordings
            SET status = ?, result = NULL, updated_at = ?
            WHERE id = ? AND status != ?
            "#,
        )
        .bind(MemoStatus::Processing.as_str())
        .bind(now)
        .bind(id)
        .bind(MemoStatus::Processing.as_str())
        .execute(&self.pool)
        .await?;

        let claimed = result.rows_affected() > 0;
        if claimed {
            self.notify();
        }
        Ok(claimed)
    }

    /// Write a processing outcome: status and result together, atomically,
    /// refreshing `updated_at`. Only applies to a row still in PROCESSING.
    pub async fn finish_processing(
        &self,
        id: i64,
        status: MemoStatus,
        result: Option<&str>,
    ) -> Result<bool, StoreError> {
        debug_assert!(MemoStatus::Processing.can_transition(status));
        let now = Utc::now().timestamp();

        let outcome = sqlx::query(
            r#"
            UPDATE recordings
            SET status = ?, result = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(status.as_str())
        .bind(result)
        .bind(now)
        .bind(id)
        .bind(MemoStatus::Processing.as_str())
        .execute(&self.pool)
        .await?;

        let written = outcome.rows_affected() > 0;
        if written {
            self.notify();
        }
        Ok(written)
    }

    /// Delete one row. Returns false (a no-op, not an error) when the
    /// row does not exist.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recordings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            self.notify();
        }
        Ok(deleted)
    }

    /// Subscribe to the change feed. The value is a revision counter
    /// bumped on every mutation; only observers subscribed at the time
    /// of a change see it (watch semantics keep just the latest value).
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|rev| *rev += 1);
    }
}

fn row_to_recording(row: &SqliteRow) -> Result<Recording, StoreError> {
    let status_text: String = row.try_get("status")?;
    let status = MemoStatus::decode(&status_text)?;

    Ok(Recording {
        id: row.try_get("id")?,
        audio_path: row.try_get("audio_path")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        captured_at: row.try_get("captured_at")?,
        status,
        result: row.try_get("result")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_memo() -> NewRecording {
        NewRecording {
            audio_path: "/tmp/VN_20260830_142501_37.7749_-122.4194.flac".to_string(),
            latitude: 37.774929,
            longitude: -122.419416,
            captured_at: 1_793_400_301,
        }
    }

    #[tokio::test]
    async fn insert_starts_not_started() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store.insert(sample_memo()).await.unwrap();

        assert!(rec.id > 0);
        assert_eq!(rec.status, MemoStatus::NotStarted);
        assert!(rec.result.is_none());
        assert!(rec.created_at <= rec.updated_at);
    }

    #[tokio::test]
    async fn get_round_trips_the_row() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store.insert(sample_memo()).await.unwrap();

        let fetched = store.get(rec.id).await.unwrap().unwrap();
        assert_eq!(fetched, rec);
    }

    #[tokio::test]
    async fn get_missing_row_is_none() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn begin_processing_claims_once() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store.insert(sample_memo()).await.unwrap();

        assert!(store.begin_processing(rec.id).await.unwrap());
        // Second claim while processing is a no-op
        assert!(!store.begin_processing(rec.id).await.unwrap());

        let row = store.get(rec.id).await.unwrap().unwrap();
        assert_eq!(row.status, MemoStatus::Processing);
    }

    #[tokio::test]
    async fn corrupt_status_fails_decoding() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let rec = store.insert(sample_memo()).await.unwrap();

        sqlx::query("UPDATE recordings SET status = 'BOGUS' WHERE id = ?")
            .bind(rec.id)
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(
            store.get(rec.id).await,
            Err(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn change_feed_bumps_on_mutation() {
        let store = RecordingStore::open_in_memory().await.unwrap();
        let mut feed = store.subscribe();
        let before = *feed.borrow_and_update();

        store.insert(sample_memo()).await.unwrap();

        assert!(feed.has_changed().unwrap());
        assert!(*feed.borrow_and_update() > before);
    }
}
