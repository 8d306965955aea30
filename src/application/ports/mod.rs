//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod announcer;
pub mod config;
pub mod locator;
pub mod recorder;
pub mod transcriber;

// Re-export common types
pub use announcer::{AnnounceError, Announcer};
pub use config::ConfigStore;
pub use locator::{LocationError, LocationSource};
pub use recorder::{AudioRecorder, ProgressCallback, RecordingError};
pub use transcriber::{SpeechTranscriber, Transcript, TranscriptionError};
