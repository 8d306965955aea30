//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::audio::AudioCodec;
use crate::domain::config::RetryConfig;
use crate::domain::error::ConfigError;
use crate::domain::memo::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    validate_config_value(key, value)?;

    let mut config = store.load().await?;

    match key {
        "access_token" => config.access_token = Some(value.to_string()),
        "endpoint" => config.endpoint = Some(value.to_string()),
        "duration" => config.duration = Some(value.to_string()),
        "language" => config.language = Some(value.to_string()),
        "codec" => config.codec = Some(value.to_lowercase()),
        "data_dir" => config.data_dir = Some(value.to_string()),
        "gpsd_addr" => config.gpsd_addr = Some(value.to_string()),
        "fix_wait" => config.fix_wait = Some(value.to_string()),
        "announce" => config.announce = Some(bool_value(key, value)?),
        "debug_log" => config.debug_log = Some(bool_value(key, value)?),
        "retry.max_attempts" => {
            let retry = config.retry.get_or_insert_with(RetryConfig::default);
            retry.max_attempts = Some(u32_value(key, value)?);
        }
        "retry.base_delay_ms" => {
            let retry = config.retry.get_or_insert_with(RetryConfig::default);
            retry.base_delay_ms = Some(u64_value(key, value)?);
        }
        _ => unreachable!(), // Already validated
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }

    let config = store.load().await?;

    let value = match key {
        "access_token" => config.access_token.map(|s| mask_token(&s)),
        "endpoint" => config.endpoint,
        "duration" => config.duration,
        "language" => config.language,
        "codec" => config.codec,
        "data_dir" => config.data_dir,
        "gpsd_addr" => config.gpsd_addr,
        "fix_wait" => config.fix_wait,
        "announce" => config.announce.map(|b| b.to_string()),
        "debug_log" => config.debug_log.map(|b| b.to_string()),
        "retry.max_attempts" => config
            .retry
            .as_ref()
            .and_then(|r| r.max_attempts)
            .map(|n| n.to_string()),
        "retry.base_delay_ms" => config
            .retry
            .as_ref()
            .and_then(|r| r.base_delay_ms)
            .map(|n| n.to_string()),
        _ => unreachable!(),
    };

    match value {
        Some(v) => presenter.output(&v),
        None => presenter.output("(not set)"),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    let not_set = || "(not set)".to_string();

    presenter.key_value(
        "access_token",
        &config
            .access_token
            .map(|s| mask_token(&s))
            .unwrap_or_else(not_set),
    );
    presenter.key_value("endpoint", config.endpoint.as_deref().unwrap_or("(not set)"));
    presenter.key_value("duration", config.duration.as_deref().unwrap_or("(not set)"));
    presenter.key_value("language", config.language.as_deref().unwrap_or("(not set)"));
    presenter.key_value("codec", config.codec.as_deref().unwrap_or("(not set)"));
    presenter.key_value("data_dir", config.data_dir.as_deref().unwrap_or("(not set)"));
    presenter.key_value(
        "gpsd_addr",
        config.gpsd_addr.as_deref().unwrap_or("(not set)"),
    );
    presenter.key_value("fix_wait", config.fix_wait.as_deref().unwrap_or("(not set)"));
    presenter.key_value(
        "announce",
        &config
            .announce
            .map(|b| b.to_string())
            .unwrap_or_else(not_set),
    );
    presenter.key_value(
        "debug_log",
        &config
            .debug_log
            .map(|b| b.to_string())
            .unwrap_or_else(not_set),
    );
    presenter.key_value(
        "retry.max_attempts",
        &config
            .retry
            .as_ref()
            .and_then(|r| r.max_attempts)
            .map(|n| n.to_string())
            .unwrap_or_else(not_set),
    );
    presenter.key_value(
        "retry.base_delay_ms",
        &config
            .retry
            .as_ref()
            .and_then(|r| r.base_delay_ms)
            .map(|n| n.to_string())
            .unwrap_or_else(not_set),
    );

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "duration" | "fix_wait" => {
            value
                .parse::<Duration>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        "codec" => {
            value
                .parse::<AudioCodec>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e,
                })?;
        }
        "announce" | "debug_log" => {
            bool_value(key, value)?;
        }
        "retry.max_attempts" => {
            let attempts = u32_value(key, value)?;
            if attempts == 0 {
                return Err(ConfigError::ValidationError {
                    key: key.to_string(),
                    message: "Value must be at least 1".to_string(),
                });
            }
        }
        "retry.base_delay_ms" => {
            u64_value(key, value)?;
        }
        _ => {} // Free-form strings
    }
    Ok(())
}

fn bool_value(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: "Value must be 'true' or 'false'".to_string(),
        }),
    }
}

fn u32_value(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::ValidationError {
        key: key.to_string(),
        message: "Value must be a non-negative integer".to_string(),
    })
}

fn u64_value(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::ValidationError {
        key: key.to_string(),
        message: "Value must be a non-negative integer".to_string(),
    })
}

/// Mask access token for display (show first 4 and last 4 chars)
fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        "*".repeat(token.len())
    } else {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    }
}
