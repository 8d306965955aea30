//! Application layer - use cases and port interfaces

pub mod capture;
pub mod export;
pub mod manage;
pub mod ports;
pub mod process;

pub use capture::{CaptureCallbacks, CaptureError, CaptureInput, CaptureMemoUseCase};
pub use export::{ExportError, Exporter};
pub use manage::{delete_memo, ManageError};
pub use process::{ProcessError, ProcessMemoUseCase, ProcessOutcome, RetryPolicy};
