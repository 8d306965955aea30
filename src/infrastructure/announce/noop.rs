//! No-op announcer for systems without a speech synthesizer

use async_trait::async_trait;

use crate::application::ports::{AnnounceError, Announcer};

/// Announcer that silently does nothing
pub struct NoopAnnouncer;

#[async_trait]
impl Announcer for NoopAnnouncer {
    async fn announce(&self, _text: &str) -> Result<(), AnnounceError> {
        Ok(())
    }
}
