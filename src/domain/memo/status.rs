//! Memo processing status state machine
//!
//! Tracks a recording's transcription lifecycle. Stored as text with an
//! explicit serialization mapping; unknown values fail decoding with a
//! classified error.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::StatusDecodeError;

/// Processing state of a recorded memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoStatus {
    /// Freshly captured, never transcribed
    NotStarted,
    /// A transcription attempt is in flight
    Processing,
    /// Transcription produced non-blank text
    Completed,
    /// Transcription failed; result holds the error message
    Error,
    /// Transcription returned no usable words; result holds a placeholder
    Fallback,
}

impl MemoStatus {
    /// Stable text representation used in the database column
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Fallback => "FALLBACK",
        }
    }

    /// Decode a stored text value back into a status.
    pub fn decode(value: &str) -> Result<Self, StatusDecodeError> {
        match value {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "PROCESSING" => Ok(Self::Processing),
            "COMPLETED" => Ok(Self::Completed),
            "ERROR" => Ok(Self::Error),
            "FALLBACK" => Ok(Self::Fallback),
            other => Err(StatusDecodeError {
                value: other.to_string(),
            }),
        }
    }

    /// Whether a transition from `self` to `to` is permitted.
    ///
    /// The only legal moves are into Processing from any non-Processing
    /// state, and out of Processing into one of the three outcomes.
    pub fn can_transition(self, to: MemoStatus) -> bool {
        use MemoStatus::*;
        matches!(
            (self, to),
            (NotStarted, Processing)
                | (Completed, Processing)
                | (Error, Processing)
                | (Fallback, Processing)
                | (Processing, Completed)
                | (Processing, Error)
                | (Processing, Fallback)
        )
    }

    /// Whether a user-initiated transcribe action is accepted in this state.
    /// Transcribing a row already in Processing is a no-op.
    pub fn accepts_transcribe(self) -> bool {
        self != Self::Processing
    }
}

impl fmt::Display for MemoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemoStatus {
    type Err = StatusDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
