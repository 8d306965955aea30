//! Speech tool detection and announcer factory

use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

use crate::application::ports::Announcer;

use super::noop::NoopAnnouncer;
use super::subprocess::SubprocessAnnouncer;

/// Available speech synthesis tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechTool {
    /// macOS built-in synthesizer
    Say,
    /// espeak-ng (preferred) or classic espeak
    EspeakNg,
    Espeak,
}

impl SpeechTool {
    fn binary(self) -> &'static str {
        match self {
            SpeechTool::Say => "say",
            SpeechTool::EspeakNg => "espeak-ng",
            SpeechTool::Espeak => "espeak",
        }
    }
}

impl fmt::Display for SpeechTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary())
    }
}

/// Check if a tool binary is available using `which`
async fn is_tool_available(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Detect the best available speech tool
///
/// On macOS: `say` first. Everywhere: espeak-ng, then espeak.
pub async fn detect_speech_tool() -> Option<SpeechTool> {
    #[cfg(target_os = "macos")]
    if is_tool_available(SpeechTool::Say.binary()).await {
        return Some(SpeechTool::Say);
    }

    if is_tool_available(SpeechTool::EspeakNg.binary()).await {
        return Some(SpeechTool::EspeakNg);
    }

    if is_tool_available(SpeechTool::Espeak.binary()).await {
        return Some(SpeechTool::Espeak);
    }

    None
}

/// Create an announcer for the best available tool.
///
/// Without any synthesizer this degrades to a no-op; announcements are
/// a courtesy, not a requirement.
pub async fn create_announcer() -> (Box<dyn Announcer>, Option<SpeechTool>) {
    match detect_speech_tool().await {
        Some(tool) => {
            tracing::debug!(%tool, "speech synthesizer detected");
            (Box::new(SubprocessAnnouncer::new(tool.binary())), Some(tool))
        }
        None => {
            tracing::debug!("no speech synthesizer found, announcements disabled");
            (Box::new(NoopAnnouncer), None)
        }
    }
}
