//! Command runners
//!
//! Each subcommand gets a runner that loads the merged configuration,
//! wires the adapters into a use case, and reports through the
//! presenter. Exit codes follow sysexits-style conventions.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::config::ConfigStore;
use crate::application::ports::ProgressCallback;
use crate::application::{
    delete_memo, CaptureCallbacks, CaptureInput, CaptureMemoUseCase, Exporter, ProcessMemoUseCase,
    ProcessOutcome, RetryPolicy,
};
use crate::domain::config::AppConfig;
use crate::domain::memo::GeoFix;
use crate::infrastructure::announce::create_announcer;
use crate::infrastructure::config::XdgConfigStore;
use crate::infrastructure::location::{GpsdLocationSource, LastKnownCache};
use crate::infrastructure::playback::play_file;
use crate::infrastructure::recording::CpalRecorder;
use crate::infrastructure::transcription::CloudSpeechTranscriber;
use crate::storage::{RecordingStore, StoreError};

use super::args::ExportFormat;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Database file name inside the data directory
const DB_FILE: &str = "ridenote.db";

/// Everything a command runner needs: merged config plus the resolved
/// data directory.
pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

impl AppContext {
    /// Load config (defaults < file < env) and resolve the data directory
    pub async fn load() -> Self {
        let config = load_merged_config().await;
        let data_dir = resolve_data_dir(&config);
        Self { config, data_dir }
    }

    async fn open_store(&self) -> Result<RecordingStore, StoreError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
        RecordingStore::open(&self.data_dir.join(DB_FILE)).await
    }
}

/// Load and merge configuration from defaults, file, and environment
pub async fn load_merged_config() -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        AppConfig::empty()
    });

    let env_config = AppConfig {
        access_token: non_empty_env("RIDENOTE_ACCESS_TOKEN")
            .or_else(|| non_empty_env("GOOGLE_ACCESS_TOKEN")),
        data_dir: non_empty_env("RIDENOTE_DATA_DIR"),
        ..Default::default()
    };

    AppConfig::defaults().merge(file_config).merge(env_config)
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// Resolve the data directory: config/env value, else the platform
/// data dir.
fn resolve_data_dir(config: &AppConfig) -> PathBuf {
    if let Some(dir) = config.data_dir.as_deref() {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ridenote")
}

/// Access token from environment or config
fn resolve_token(config: &AppConfig) -> Result<String, String> {
    config.access_token.clone().ok_or_else(|| {
        "Missing access token. Set RIDENOTE_ACCESS_TOKEN or run 'ridenote config set access_token <token>'"
            .to_string()
    })
}

/// Options for the record command after config merging
pub struct RecordOptions {
    pub duration: crate::domain::memo::Duration,
    pub manual_fix: Option<GeoFix>,
    pub announce: bool,
}

/// Record a new memo
pub async fn run_record(ctx: AppContext, options: RecordOptions) -> ExitCode {
    let presenter = Presenter::new();

    let store = match ctx.open_store().await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let recorder = CpalRecorder::new(ctx.config.codec_or_default());
    let cache = LastKnownCache::new(&ctx.data_dir);
    let locator = GpsdLocationSource::new(ctx.config.gpsd_addr_or_default(), cache);
    let (announcer, _tool) = create_announcer().await;

    let use_case = CaptureMemoUseCase::new(recorder, locator, announcer, store, &ctx.data_dir);

    let input = CaptureInput {
        duration: options.duration,
        manual_fix: options.manual_fix,
        fix_wait: ctx.config.fix_wait_or_default().as_std(),
        announce: options.announce,
    };

    let bar = ProgressBar::new(input.duration.as_millis());
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:20.cyan} {msg}")
    {
        bar.set_style(style);
    }
    bar.set_message("Recording...");

    let progress_bar = bar.clone();
    let on_progress: ProgressCallback = Arc::new(move |elapsed, _total| {
        progress_bar.set_position(elapsed);
    });

    let callbacks = CaptureCallbacks {
        on_progress: Some(on_progress),
        on_fix: Some(Box::new(|fix: &GeoFix, from_cache: bool| {
            if from_cache {
                eprintln!("⚠ No fresh fix, using last known location: {}", fix);
            } else {
                eprintln!("ℹ Location: {}", fix);
            }
        })),
        on_recording_start: None,
        on_recording_end: Some(Box::new(|size: &str| {
            eprintln!("✓ Recording complete ({})", size);
        })),
    };

    match use_case.execute(input, callbacks).await {
        Ok(recording) => {
            bar.finish_and_clear();
            presenter.success(&format!(
                "Memo {} saved: {}",
                recording.id, recording.audio_path
            ));
            presenter.info("Transcribe it with: ridenote transcribe <id>");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            bar.finish_and_clear();
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// List all memos
pub async fn run_list(ctx: AppContext) -> ExitCode {
    let presenter = Presenter::new();

    let result = async {
        let store = ctx.open_store().await?;
        store.list().await
    }
    .await;

    match result {
        Ok(recordings) => {
            presenter.memo_list(&recordings);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Play a memo's audio file
pub async fn run_play(ctx: AppContext, id: i64) -> ExitCode {
    let presenter = Presenter::new();

    let recording = match ctx.open_store().await {
        Ok(store) => match store.get(id).await {
            Ok(Some(rec)) => rec,
            Ok(None) => {
                presenter.error(&format!("No memo with id {}", id));
                return ExitCode::from(EXIT_ERROR);
            }
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
        },
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.info(&format!("Playing {}", recording.audio_path));
    match play_file(recording.audio_path).await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Transcribe one memo
pub async fn run_transcribe(ctx: AppContext, id: i64) -> ExitCode {
    let mut presenter = Presenter::new();

    let token = match resolve_token(&ctx.config) {
        Ok(token) => token,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let store = match ctx.open_store().await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let transcriber = match ctx.config.endpoint.as_deref() {
        Some(endpoint) => CloudSpeechTranscriber::with_endpoint(token, endpoint),
        None => CloudSpeechTranscriber::new(token),
    };

    let policy = RetryPolicy::new(
        ctx.config.retry_max_attempts_or_default(),
        std::time::Duration::from_millis(ctx.config.retry_base_delay_ms_or_default()),
    );

    let use_case = ProcessMemoUseCase::new(
        transcriber,
        store,
        policy,
        ctx.config.language_or_default(),
    );

    presenter.start_spinner("Transcribing...");

    match use_case.execute(id).await {
        Ok(ProcessOutcome::Completed(text)) => {
            presenter.spinner_success("Transcription complete");
            presenter.output(&text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(ProcessOutcome::Fallback(placeholder)) => {
            presenter.spinner_success("No speech recognized, kept coordinates");
            presenter.output(&placeholder);
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(ProcessOutcome::Failed(message)) => {
            presenter.spinner_fail(&message);
            presenter.info("Retry with: ridenote transcribe <id>");
            ExitCode::from(EXIT_ERROR)
        }
        Ok(ProcessOutcome::Skipped) => {
            presenter.stop_spinner();
            presenter.warn(&format!("Memo {} is already being transcribed", id));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Delete a memo and its audio file
pub async fn run_delete(ctx: AppContext, id: i64) -> ExitCode {
    let presenter = Presenter::new();

    let result = async {
        let store = ctx.open_store().await?;
        Ok::<_, crate::application::ManageError>(delete_memo(&store, id).await?)
    }
    .await;

    match result {
        Ok(true) => {
            presenter.success(&format!("Memo {} deleted", id));
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(false) => {
            // Deleting a missing memo is a no-op, not a failure
            presenter.warn(&format!("No memo with id {}", id));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Watch the store and reprint the list on every change
pub async fn run_watch(ctx: AppContext) -> ExitCode {
    let presenter = Presenter::new();

    let store = match ctx.open_store().await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut feed = store.subscribe();
    feed.borrow_and_update();

    match store.list().await {
        Ok(recordings) => presenter.memo_list(&recordings),
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }
    presenter.info("Watching for changes (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                match store.list().await {
                    Ok(recordings) => {
                        presenter.output("");
                        presenter.memo_list(&recordings);
                    }
                    Err(e) => {
                        presenter.error(&e.to_string());
                        return ExitCode::from(EXIT_ERROR);
                    }
                }
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Export memos in the requested format
pub async fn run_export(ctx: AppContext, format: ExportFormat) -> ExitCode {
    let presenter = Presenter::new();

    let store = match ctx.open_store().await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let exporter = Exporter::new(store);

    let result = match format {
        ExportFormat::Gpx { out } => exporter
            .write_gpx(&out)
            .await
            .map(|count| format!("Wrote {} waypoints to {}", count, out.display())),
        ExportFormat::Csv { out } => exporter
            .write_csv(&out)
            .await
            .map(|count| format!("Wrote {} rows to {}", count, out.display())),
        ExportFormat::Audio { out_dir } => match exporter.copy_audio(&out_dir).await {
            Ok((copied, missing)) => {
                for path in &missing {
                    presenter.warn(&format!("Audio file missing: {}", path));
                }
                Ok(format!("Copied {} files to {}", copied, out_dir.display()))
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(message) => {
            presenter.success(&message);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
