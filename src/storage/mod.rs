//! Storage layer - the recording store over SQLite

pub mod store;

pub use store::{RecordingStore, StoreError};
