//! Voice memo domain types

pub mod duration;
pub mod filename;
pub mod location;
pub mod recording;
pub mod status;

pub use duration::Duration;
pub use filename::{memo_filename, parse_filename, ParsedFilename};
pub use location::GeoFix;
pub use recording::{NewRecording, Recording};
pub use status::MemoStatus;
