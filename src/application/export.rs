//! Export use case
//!
//! Builds GPX and CSV documents from the stored recordings and copies
//! audio files out. Document construction is pure string building so
//! the formats are testable without touching the filesystem.

use std::path::Path;

use chrono::{TimeZone, Utc};
use thiserror::Error;

use crate::domain::memo::Recording;
use crate::storage::{RecordingStore, StoreError};

/// Errors from the export use case
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to write export: {0}")]
    Io(String),
}

/// Exports stored memos as GPX waypoints, CSV rows, or raw audio files
pub struct Exporter {
    store: RecordingStore,
}

impl Exporter {
    pub fn new(store: RecordingStore) -> Self {
        Self { store }
    }

    /// Write all memos as a GPX waypoint file. Returns the waypoint count.
    pub async fn write_gpx(&self, path: &Path) -> Result<usize, ExportError> {
        let recordings = self.store.list().await?;
        let document = gpx_document(&recordings);

        tokio::fs::write(path, document)
            .await
            .map_err(|e| ExportError::Io(e.to_string()))?;

        Ok(recordings.len())
    }

    /// Write all memos as a CSV file. Returns the row count.
    pub async fn write_csv(&self, path: &Path) -> Result<usize, ExportError> {
        let recordings = self.store.list().await?;
        let document = csv_document(&recordings);

        tokio::fs::write(path, document)
            .await
            .map_err(|e| ExportError::Io(e.to_string()))?;

        Ok(recordings.len())
    }

    /// Copy every memo's audio file into the given directory.
    ///
    /// Returns the number of files copied plus the paths that were
    /// missing on disk. A missing file is reported, never fatal.
    pub async fn copy_audio(&self, out_dir: &Path) -> Result<(usize, Vec<String>), ExportError> {
        let recordings = self.store.list().await?;

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|e| ExportError::Io(e.to_string()))?;

        let mut copied = 0usize;
        let mut missing = Vec::new();

        for rec in &recordings {
            let source = Path::new(&rec.audio_path);
            let Some(name) = source.file_name() else {
                missing.push(rec.audio_path.clone());
                continue;
            };

            match tokio::fs::copy(source, out_dir.join(name)).await {
                Ok(_) => copied += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %rec.audio_path, "audio file missing, skipping");
                    missing.push(rec.audio_path.clone());
                }
                Err(e) => return Err(ExportError::Io(e.to_string())),
            }
        }

        Ok((copied, missing))
    }
}

/// Build a GPX 1.1 document with one waypoint per memo.
pub fn gpx_document(recordings: &[Recording]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<gpx version=\"1.1\" creator=\"ridenote\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );

    for rec in recordings {
        out.push_str(&format!(
            "  <wpt lat=\"{}\" lon=\"{}\">\n",
            rec.latitude, rec.longitude
        ));
        if let Some(time) = rfc3339(rec.captured_at) {
            out.push_str(&format!("    <time>{}</time>\n", time));
        }
        if let Some(stem) = Path::new(&rec.audio_path).file_stem().and_then(|s| s.to_str()) {
            out.push_str(&format!("    <name>{}</name>\n", xml_escape(stem)));
        }
        if let Some(ref text) = rec.result {
            out.push_str(&format!("    <desc>{}</desc>\n", xml_escape(text)));
        }
        out.push_str("  </wpt>\n");
    }

    out.push_str("</gpx>\n");
    out
}

/// Build a CSV document with a UTF-8 BOM so spreadsheet tools detect
/// the encoding.
pub fn csv_document(recordings: &[Recording]) -> String {
    let mut out = String::from("\u{feff}latitude,longitude,timestamp,transcription\n");

    for rec in recordings {
        out.push_str(&format!(
            "{},{},{},{}\n",
            rec.latitude,
            rec.longitude,
            rec.captured_at,
            csv_field(rec.result.as_deref().unwrap_or(""))
        ));
    }

    out
}

fn rfc3339(epoch_secs: i64) -> Option<String> {
    Utc.timestamp_opt(epoch_secs, 0)
        .single()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn csv_field(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::memo::MemoStatus;

    fn recording(id: i64, lat: f64, lon: f64, result: Option<&str>) -> Recording {
        Recording {
            id,
            audio_path: format!("/data/VN_20260830_14250{}_37.7749_-122.4194.flac", id),
            latitude: lat,
            longitude: lon,
            captured_at: 1_793_400_301,
            status: MemoStatus::Completed,
            result: result.map(str::to_string),
            created_at: 1_793_400_301,
            updated_at: 1_793_400_330,
        }
    }

    #[test]
    fn gpx_has_one_waypoint_per_memo() {
        let recs = vec![
            recording(1, 37.774929, -122.419416, Some("check tire pressure")),
            recording(2, 48.1374, 11.5755, None),
        ];
        let doc = gpx_document(&recs);

        assert_eq!(doc.matches("<wpt ").count(), 2);
        assert!(doc.contains("lat=\"37.774929\""));
        assert!(doc.contains("lon=\"-122.419416\""));
        assert!(doc.contains("<desc>check tire pressure</desc>"));
        assert!(doc.contains("<time>"));
        assert!(doc.starts_with("<?xml"));
        assert!(doc.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn gpx_escapes_markup_in_transcripts() {
        let recs = vec![recording(1, 1.0, 2.0, Some("speed <100 & rising"))];
        let doc = gpx_document(&recs);

        assert!(doc.contains("<desc>speed &lt;100 &amp; rising</desc>"));
        assert!(!doc.contains("<desc>speed <100"));
    }

    #[test]
    fn gpx_omits_desc_without_transcript() {
        let doc = gpx_document(&[recording(1, 1.0, 2.0, None)]);
        assert!(!doc.contains("<desc>"));
    }

    #[test]
    fn csv_starts_with_bom_and_header() {
        let doc = csv_document(&[]);
        assert!(doc.starts_with('\u{feff}'));
        assert!(doc.contains("latitude,longitude,timestamp,transcription"));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let recs = vec![recording(1, 37.774929, -122.419416, Some("fuel, oil, chain"))];
        let doc = csv_document(&recs);

        assert!(doc.contains("\"fuel, oil, chain\""));
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let recs = vec![recording(1, 1.0, 2.0, Some("the \"good\" road"))];
        let doc = csv_document(&recs);

        assert!(doc.contains("\"the \"\"good\"\" road\""));
    }

    #[test]
    fn csv_empty_transcript_is_an_empty_field() {
        let recs = vec![recording(1, 1.0, 2.0, None)];
        let doc = csv_document(&recs);

        assert!(doc.contains("1,2,1793400301,\n"));
    }

    #[tokio::test]
    async fn copy_audio_reports_missing_files() {
        use crate::domain::memo::NewRecording;
        use tempfile::TempDir;

        let src_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let store = crate::storage::RecordingStore::open_in_memory().await.unwrap();

        let present = src_dir.path().join("VN_20260830_142501_1.0000_2.0000.flac");
        std::fs::write(&present, b"audio").unwrap();

        for path in [
            present.to_string_lossy().into_owned(),
            "/gone/VN_20260830_142502_1.0000_2.0000.flac".to_string(),
        ] {
            store
                .insert(NewRecording {
                    audio_path: path,
                    latitude: 1.0,
                    longitude: 2.0,
                    captured_at: 1_793_400_301,
                })
                .await
                .unwrap();
        }

        let exporter = Exporter::new(store);
        let (copied, missing) = exporter.copy_audio(out_dir.path()).await.unwrap();

        assert_eq!(copied, 1);
        assert_eq!(missing.len(), 1);
        assert!(out_dir
            .path()
            .join("VN_20260830_142501_1.0000_2.0000.flac")
            .exists());
    }
}
