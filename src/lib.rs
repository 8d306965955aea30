//! Ridenote - GPS-tagged voice memo recorder and transcriber
//!
//! This crate records short, fixed-duration voice memos tagged with the
//! current location, keeps them in a local SQLite table, and transcribes
//! them through a cloud speech-to-text endpoint.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Entities, value objects (status machine, filenames, fixes)
//! - **Application**: Use cases and port interfaces (traits)
//! - **Storage**: The recording store over SQLite, with a change feed
//! - **Infrastructure**: Adapter implementations (cpal, cloud speech, gpsd, TTS)
//! - **CLI**: Command-line interface and terminal presentation

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod storage;
