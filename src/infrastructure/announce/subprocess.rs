//! Subprocess speech synthesizer
//!
//! Runs a system text-to-speech binary (`say` on macOS, `espeak` or
//! `espeak-ng` elsewhere) with the text as its argument.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{AnnounceError, Announcer};

/// Announcer shelling out to a text-to-speech binary
pub struct SubprocessAnnouncer {
    program: String,
}

impl SubprocessAnnouncer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Announcer for SubprocessAnnouncer {
    async fn announce(&self, text: &str) -> Result<(), AnnounceError> {
        let status = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| AnnounceError::SynthFailed(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(AnnounceError::SynthFailed(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        Ok(())
    }
}
