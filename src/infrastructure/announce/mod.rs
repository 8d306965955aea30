//! Speech announcement adapters

pub mod factory;
pub mod noop;
pub mod subprocess;

pub use factory::{create_announcer, detect_speech_tool, SpeechTool};
pub use noop::NoopAnnouncer;
pub use subprocess::SubprocessAnnouncer;
