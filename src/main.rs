//! ridenote CLI entry point

use std::process::ExitCode;

use clap::Parser;

use ridenote::cli::{
    app::{
        run_delete, run_export, run_list, run_play, run_record, run_transcribe, run_watch,
        AppContext, RecordOptions, EXIT_ERROR, EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    logging,
    presenter::Presenter,
};
use ridenote::domain::memo::{Duration, GeoFix};
use ridenote::infrastructure::config::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Config commands work without a data directory or logging
    let command = match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        command => command,
    };

    let ctx = AppContext::load().await;
    logging::init(ctx.config.debug_log_or_default(), &ctx.data_dir);

    match command {
        Commands::Record {
            duration,
            lat,
            lon,
            no_announce,
        } => {
            // CLI duration overrides the configured one
            let duration = match duration {
                Some(s) => match s.parse::<Duration>() {
                    Ok(d) => d,
                    Err(e) => {
                        presenter.error(&format!("Invalid duration: {}", e));
                        return ExitCode::from(EXIT_USAGE_ERROR);
                    }
                },
                None => ctx.config.duration_or_default(),
            };

            let manual_fix = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(GeoFix::new(lat, lon)),
                _ => None,
            };

            let options = RecordOptions {
                duration,
                manual_fix,
                announce: !no_announce && ctx.config.announce_or_default(),
            };

            run_record(ctx, options).await
        }
        Commands::List => run_list(ctx).await,
        Commands::Play { id } => run_play(ctx, id).await,
        Commands::Transcribe { id } => run_transcribe(ctx, id).await,
        Commands::Delete { id } => run_delete(ctx, id).await,
        Commands::Watch => run_watch(ctx).await,
        Commands::Export { format } => run_export(ctx, format).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}
