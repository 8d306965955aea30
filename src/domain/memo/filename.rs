//! Memo filename convention
//!
//! Audio files are named `VN_<yyyymmdd>_<hhmmss>_<lat>_<lon>.<ext>` with
//! four-decimal-place coordinates, and parsed back with a fixed-field
//! regular expression.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::domain::error::FilenameParseError;
use crate::domain::memo::GeoFix;

/// Fields recovered from a memo filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilename {
    pub captured_at: DateTime<Utc>,
    pub fix: GeoFix,
    pub extension: String,
}

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^VN_(\d{8})_(\d{6})_(-?\d+\.\d{4})_(-?\d+\.\d{4})\.([A-Za-z0-9]+)$")
            .expect("filename regex is valid")
    })
}

/// Build a memo filename from its capture time, fix, and audio extension.
pub fn memo_filename(captured_at: DateTime<Utc>, fix: GeoFix, extension: &str) -> String {
    format!(
        "VN_{}_{}_{:.4}_{:.4}.{}",
        captured_at.format("%Y%m%d"),
        captured_at.format("%H%M%S"),
        fix.latitude,
        fix.longitude,
        extension
    )
}

/// Parse a memo filename back into its fields.
pub fn parse_filename(name: &str) -> Result<ParsedFilename, FilenameParseError> {
    let err = || FilenameParseError {
        input: name.to_string(),
    };

    let caps = filename_regex().captures(name).ok_or_else(err)?;

    let stamp = format!("{}{}", &caps[1], &caps[2]);
    let captured_at = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S")
        .map_err(|_| err())?
        .and_utc();

    let latitude: f64 = caps[3].parse().map_err(|_| err())?;
    let longitude: f64 = caps[4].parse().map_err(|_| err())?;

    Ok(ParsedFilename {
        captured_at,
        fix: GeoFix::new(latitude, longitude),
        extension: caps[5].to_string(),
    })
}
