//! Domain layer - entities, value objects, and domain errors
//!
//! No dependencies on infrastructure or external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod memo;
