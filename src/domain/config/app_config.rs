//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::audio::AudioCodec;
use crate::domain::memo::Duration;

/// Retry policy section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub access_token: Option<String>,
    pub endpoint: Option<String>,
    pub duration: Option<String>,
    pub language: Option<String>,
    pub codec: Option<String>,
    pub data_dir: Option<String>,
    pub gpsd_addr: Option<String>,
    pub fix_wait: Option<String>,
    pub announce: Option<bool>,
    pub debug_log: Option<bool>,
    pub retry: Option<RetryConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            access_token: None,
            endpoint: None,
            duration: Some("30s".to_string()),
            language: Some("en-US".to_string()),
            codec: Some("flac".to_string()),
            data_dir: None,
            gpsd_addr: Some("127.0.0.1:2947".to_string()),
            fix_wait: Some("5s".to_string()),
            announce: Some(true),
            debug_log: Some(false),
            retry: Some(RetryConfig {
                max_attempts: Some(3),
                base_delay_ms: Some(500),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            access_token: other.access_token.or(self.access_token),
            endpoint: other.endpoint.or(self.endpoint),
            duration: other.duration.or(self.duration),
            language: other.language.or(self.language),
            codec: other.codec.or(self.codec),
            data_dir: other.data_dir.or(self.data_dir),
            gpsd_addr: other.gpsd_addr.or(self.gpsd_addr),
            fix_wait: other.fix_wait.or(self.fix_wait),
            announce: other.announce.or(self.announce),
            debug_log: other.debug_log.or(self.debug_log),
            retry: Self::merge_retry(self.retry, other.retry),
        }
    }

    fn merge_retry(base: Option<RetryConfig>, other: Option<RetryConfig>) -> Option<RetryConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(RetryConfig {
                max_attempts: o.max_attempts.or(b.max_attempts),
                base_delay_ms: o.base_delay_ms.or(b.base_delay_ms),
            }),
        }
    }

    /// Get capture duration as parsed Duration, or default if not set/invalid
    pub fn duration_or_default(&self) -> Duration {
        self.duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_capture)
    }

    /// Get the location fix wait, or default if not set/invalid
    pub fn fix_wait_or_default(&self) -> Duration {
        self.fix_wait
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_fix_wait)
    }

    /// Get the language code, or "en-US" if not set
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("en-US")
    }

    /// Get the capture codec, or FLAC if not set/invalid
    pub fn codec_or_default(&self) -> AudioCodec {
        self.codec
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get the gpsd address, or the local default
    pub fn gpsd_addr_or_default(&self) -> &str {
        self.gpsd_addr.as_deref().unwrap_or("127.0.0.1:2947")
    }

    /// Get the announce setting, or true if not set
    pub fn announce_or_default(&self) -> bool {
        self.announce.unwrap_or(true)
    }

    /// Get the debug-log toggle, or false if not set
    pub fn debug_log_or_default(&self) -> bool {
        self.debug_log.unwrap_or(false)
    }

    /// Get retry attempts, or 3 if not set
    pub fn retry_max_attempts_or_default(&self) -> u32 {
        self.retry
            .as_ref()
            .and_then(|r| r.max_attempts)
            .unwrap_or(3)
    }

    /// Get retry base delay in milliseconds, or 500 if not set
    pub fn retry_base_delay_ms_or_default(&self) -> u64 {
        self.retry
            .as_ref()
            .and_then(|r| r.base_delay_ms)
            .unwrap_or(500)
    }
}
