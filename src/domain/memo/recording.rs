//! Recording entity

use crate::domain::memo::{GeoFix, MemoStatus};

/// A captured voice memo row.
///
/// `audio_path`, coordinates, and `captured_at` are immutable after
/// creation; `status` and `result` change only through the processing
/// flow and are always written together.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub id: i64,
    pub audio_path: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Capture time, epoch seconds
    pub captured_at: i64,
    pub status: MemoStatus,
    /// Transcribed text, fallback placeholder, or error message
    pub result: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Recording {
    pub fn fix(&self) -> GeoFix {
        GeoFix::new(self.latitude, self.longitude)
    }
}

/// Fields for inserting a freshly captured memo.
/// Rows always start in `NotStarted` with no result.
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub audio_path: String,
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_from_row_coordinates() {
        let rec = Recording {
            id: 1,
            audio_path: "/tmp/a.flac".into(),
            latitude: 37.774929,
            longitude: -122.419416,
            captured_at: 100,
            status: MemoStatus::NotStarted,
            result: None,
            created_at: 100,
            updated_at: 100,
        };
        assert_eq!(rec.fix(), GeoFix::new(37.774929, -122.419416));
    }
}
