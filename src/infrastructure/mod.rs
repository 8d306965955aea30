//! Infrastructure layer - adapters for external services and devices

pub mod announce;
pub mod config;
pub mod location;
pub mod playback;
pub mod recording;
pub mod transcription;
