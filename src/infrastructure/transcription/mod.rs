//! Speech recognition adapters

pub mod cloud_speech;

pub use cloud_speech::CloudSpeechTranscriber;
