//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ridenote - GPS-tagged voice memos for riders
#[derive(Parser, Debug)]
#[command(name = "ridenote")]
#[command(version)]
#[command(about = "Record, transcribe, and export GPS-tagged voice memos")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new memo at the current location
    Record {
        /// Recording duration (e.g., 30s, 1m, 2m30s)
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,

        /// Manual latitude in degrees (skips the GPS fix)
        #[arg(long, value_name = "DEG", requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Manual longitude in degrees
        #[arg(long, value_name = "DEG", requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Skip the spoken announcement
        #[arg(long)]
        no_announce: bool,
    },
    /// List stored memos
    List,
    /// Play a memo's audio
    Play {
        /// Memo id
        id: i64,
    },
    /// Transcribe a memo (or retry a failed one)
    Transcribe {
        /// Memo id
        id: i64,
    },
    /// Delete a memo and its audio file
    Delete {
        /// Memo id
        id: i64,
    },
    /// Watch the memo store and reprint the list on every change
    Watch,
    /// Export memos
    Export {
        #[command(subcommand)]
        format: ExportFormat,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Export formats
#[derive(Subcommand, Debug)]
pub enum ExportFormat {
    /// GPX waypoint file
    Gpx {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// CSV file (one row per memo)
    Csv {
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Copy the raw audio files
    Audio {
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out_dir: PathBuf,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "access_token",
    "endpoint",
    "duration",
    "language",
    "codec",
    "data_dir",
    "gpsd_addr",
    "fix_wait",
    "announce",
    "debug_log",
    "retry.max_attempts",
    "retry.base_delay_ms",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_record_defaults() {
        let cli = Cli::parse_from(["ridenote", "record"]);
        match cli.command {
            Commands::Record {
                duration,
                lat,
                lon,
                no_announce,
            } => {
                assert!(duration.is_none());
                assert!(lat.is_none());
                assert!(lon.is_none());
                assert!(!no_announce);
            }
            _ => panic!("Expected Record command"),
        }
    }

    #[test]
    fn cli_parses_record_with_duration() {
        let cli = Cli::parse_from(["ridenote", "record", "-d", "45s"]);
        match cli.command {
            Commands::Record { duration, .. } => assert_eq!(duration, Some("45s".to_string())),
            _ => panic!("Expected Record command"),
        }
    }

    #[test]
    fn cli_parses_manual_fix() {
        let cli = Cli::parse_from([
            "ridenote", "record", "--lat", "37.7749", "--lon", "-122.4194",
        ]);
        match cli.command {
            Commands::Record { lat, lon, .. } => {
                assert_eq!(lat, Some(37.7749));
                assert_eq!(lon, Some(-122.4194));
            }
            _ => panic!("Expected Record command"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["ridenote", "record", "--lat", "37.7"]).is_err());
    }

    #[test]
    fn cli_parses_transcribe_id() {
        let cli = Cli::parse_from(["ridenote", "transcribe", "7"]);
        match cli.command {
            Commands::Transcribe { id } => assert_eq!(id, 7),
            _ => panic!("Expected Transcribe command"),
        }
    }

    #[test]
    fn cli_parses_export_gpx() {
        let cli = Cli::parse_from(["ridenote", "export", "gpx", "-o", "trip.gpx"]);
        match cli.command {
            Commands::Export {
                format: ExportFormat::Gpx { out },
            } => assert_eq!(out, PathBuf::from("trip.gpx")),
            _ => panic!("Expected Export Gpx command"),
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["ridenote", "config", "set", "language", "de-DE"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "language");
            assert_eq!(value, "de-DE");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("access_token"));
        assert!(is_valid_config_key("gpsd_addr"));
        assert!(is_valid_config_key("retry.max_attempts"));
        assert!(!is_valid_config_key("invalid_key"));
    }

    #[test]
    fn verify_cli() {
        // Verify the CLI definition is valid
        Cli::command().debug_assert();
    }
}
