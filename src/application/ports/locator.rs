//! Location port interface

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::memo::GeoFix;

/// Location errors
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("No location fix within {0:?}")]
    Timeout(StdDuration),

    #[error("Location source unavailable: {0}")]
    Unavailable(String),

    #[error("No location fix available")]
    NoFix,
}

/// Port for obtaining a location fix
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Wait for a fresh fix, bounded by `timeout`.
    async fn current_fix(&self, timeout: StdDuration) -> Result<GeoFix, LocationError>;

    /// The most recent fix seen, if any. Used as fallback when a fresh
    /// fix does not arrive in time.
    async fn last_known(&self) -> Option<GeoFix>;
}
