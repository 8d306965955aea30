//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, logging setup, and
//! the per-command runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod logging;
pub mod presenter;

// Re-export commonly used types
pub use app::{
    load_merged_config, run_delete, run_export, run_list, run_play, run_record, run_transcribe,
    run_watch, AppContext, RecordOptions, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR,
};
pub use args::{Cli, Commands, ConfigAction, ExportFormat};
pub use config_cmd::handle_config_command;
pub use presenter::Presenter;
