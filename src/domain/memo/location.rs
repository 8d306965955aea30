//! Location fix value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoFix {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Placeholder result text for memos whose transcription returned no
    /// usable words. Six decimal places, unlike the four used in filenames.
    pub fn fallback_placeholder(&self) -> String {
        format!("{:.6},{:.6} (no text)", self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}
