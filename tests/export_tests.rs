//! Export integration tests
//!
//! Drive the exporter against a real store and check the files it
//! leaves on disk.

use tempfile::TempDir;

use ridenote::application::Exporter;
use ridenote::domain::memo::{MemoStatus, NewRecording};
use ridenote::storage::RecordingStore;

async fn store_with_two_memos() -> RecordingStore {
    let store = RecordingStore::open_in_memory().await.unwrap();

    let first = store
        .insert(NewRecording {
            audio_path: "/data/VN_20260830_142501_37.7749_-122.4194.flac".to_string(),
            latitude: 37.774929,
            longitude: -122.419416,
            captured_at: 1_793_400_301,
        })
        .await
        .unwrap();
    store.begin_processing(first.id).await.unwrap();
    store
        .finish_processing(first.id, MemoStatus::Completed, Some("check tire pressure"))
        .await
        .unwrap();

    store
        .insert(NewRecording {
            audio_path: "/data/VN_20260830_153012_48.1374_11.5755.flac".to_string(),
            latitude: 48.1374,
            longitude: 11.5755,
            captured_at: 1_793_404_212,
        })
        .await
        .unwrap();

    store
}

#[tokio::test]
async fn gpx_file_holds_every_memo_as_a_waypoint() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("memos.gpx");

    let count = Exporter::new(store_with_two_memos().await)
        .write_gpx(&out)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let doc = std::fs::read_to_string(&out).unwrap();
    assert!(doc.starts_with("<?xml"));
    assert_eq!(doc.matches("<wpt ").count(), 2);
    assert!(doc.contains("lat=\"37.774929\""));
    assert!(doc.contains("lat=\"48.1374\""));
    assert!(doc.contains("<desc>check tire pressure</desc>"));
    assert!(doc.contains("<name>VN_20260830_142501_37.7749_-122.4194</name>"));
}

#[tokio::test]
async fn csv_file_has_bom_header_and_rows() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("memos.csv");

    let count = Exporter::new(store_with_two_memos().await)
        .write_csv(&out)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let doc = std::fs::read_to_string(&out).unwrap();
    assert!(doc.starts_with('\u{feff}'));

    let lines: Vec<&str> = doc.trim_end().lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("latitude,longitude,timestamp,transcription"));
    // List order is newest first
    assert!(lines[1].starts_with("48.1374,11.5755,1793404212,"));
    assert!(lines[2].contains("check tire pressure"));
}

#[tokio::test]
async fn empty_store_still_writes_valid_documents() {
    let dir = TempDir::new().unwrap();
    let store = RecordingStore::open_in_memory().await.unwrap();
    let exporter = Exporter::new(store);

    let gpx = dir.path().join("empty.gpx");
    let csv = dir.path().join("empty.csv");
    assert_eq!(exporter.write_gpx(&gpx).await.unwrap(), 0);
    assert_eq!(exporter.write_csv(&csv).await.unwrap(), 0);

    let gpx_doc = std::fs::read_to_string(&gpx).unwrap();
    assert!(gpx_doc.contains("</gpx>"));
    assert!(!gpx_doc.contains("<wpt"));

    let csv_doc = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(csv_doc.trim_end().lines().count(), 1);
}

#[tokio::test]
async fn audio_export_copies_the_files_it_can_find() {
    let src = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let present = src.path().join("VN_20260830_142501_37.7749_-122.4194.flac");
    std::fs::write(&present, b"fLaC").unwrap();

    let store = RecordingStore::open_in_memory().await.unwrap();
    store
        .insert(NewRecording {
            audio_path: present.to_string_lossy().into_owned(),
            latitude: 37.774929,
            longitude: -122.419416,
            captured_at: 1_793_400_301,
        })
        .await
        .unwrap();
    store
        .insert(NewRecording {
            audio_path: "/nowhere/VN_20260830_153012_48.1374_11.5755.flac".to_string(),
            latitude: 48.1374,
            longitude: 11.5755,
            captured_at: 1_793_404_212,
        })
        .await
        .unwrap();

    let (copied, missing) = Exporter::new(store)
        .copy_audio(&out.path().join("audio"))
        .await
        .unwrap();

    assert_eq!(copied, 1);
    assert_eq!(missing, vec!["/nowhere/VN_20260830_153012_48.1374_11.5755.flac"]);
    assert!(out
        .path()
        .join("audio")
        .join("VN_20260830_142501_37.7749_-122.4194.flac")
        .exists());
}
