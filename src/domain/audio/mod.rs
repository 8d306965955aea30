//! Audio value objects

pub mod audio_data;

pub use audio_data::{AudioCodec, AudioData, TARGET_SAMPLE_RATE};
