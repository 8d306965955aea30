//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default capture duration (30 seconds)
pub const DEFAULT_CAPTURE_SECS: u64 = 30;

/// Default wait for a location fix (5 seconds)
pub const DEFAULT_FIX_WAIT_SECS: u64 = 5;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default capture duration (30 seconds)
    pub const fn default_capture() -> Self {
        Self::from_secs(DEFAULT_CAPTURE_SECS)
    }

    /// Default location fix wait (5 seconds)
    pub const fn default_fix_wait() -> Self {
        Self::from_secs(DEFAULT_FIX_WAIT_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse a duration string. Supported formats: "30s", "1m", "2m30s".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError {
            input: s.to_string(),
        };
        let input = s.trim().to_lowercase();

        let mut minutes: u64 = 0;
        let mut seconds: u64 = 0;
        let mut digits = String::new();
        let mut found_any = false;

        for ch in input.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                'm' if !digits.is_empty() => {
                    minutes = digits.parse().map_err(|_| invalid())?;
                    digits.clear();
                    found_any = true;
                }
                's' if !digits.is_empty() => {
                    seconds = digits.parse().map_err(|_| invalid())?;
                    digits.clear();
                    found_any = true;
                }
                _ => return Err(invalid()),
            }
        }

        // Trailing bare digits (e.g. "30") are not a valid format
        if !digits.is_empty() || !found_any {
            return Err(invalid());
        }

        let total_ms = (minutes * 60 + seconds) * 1000;
        if total_ms == 0 {
            return Err(invalid());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_capture()
    }
}
