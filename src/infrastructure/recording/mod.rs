//! Audio recording adapters

pub mod cpal_recorder;
pub mod flac_encoder;
pub mod wav_encoder;

pub use cpal_recorder::CpalRecorder;
