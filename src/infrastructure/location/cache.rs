//! Last-known fix cache
//!
//! A small JSON file next to the recordings, refreshed on every fresh
//! fix. It lets a capture proceed when the receiver cannot lock in
//! time (tunnel, parking garage).

use std::path::PathBuf;

use crate::domain::memo::GeoFix;

/// File-backed cache of the most recent fix
pub struct LastKnownCache {
    path: PathBuf,
}

impl LastKnownCache {
    /// Cache file name inside the data directory
    const FILE_NAME: &'static str = "last_fix.json";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(Self::FILE_NAME),
        }
    }

    /// Load the cached fix, if any. Unreadable or malformed content is
    /// treated as no cache.
    pub async fn load(&self) -> Option<GeoFix> {
        let content = tokio::fs::read_to_string(&self.path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(fix) => Some(fix),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt fix cache");
                None
            }
        }
    }

    /// Persist a fix. Best effort; failures are logged, not surfaced.
    pub async fn save(&self, fix: GeoFix) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(error = %e, "could not create fix cache directory");
                return;
            }
        }

        match serde_json::to_string(&fix) {
            Ok(content) => {
                if let Err(e) = tokio::fs::write(&self.path, content).await {
                    tracing::warn!(error = %e, "could not write fix cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize fix"),
        }
    }
}
