//! Logging Configuration

use anyhow::{anyhow, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "HSLTALKS_LOG_LEVEL";

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

fn default_level(is_debug: bool) -> LevelFilter {
    if is_debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

pub fn resolve_default_level(is_debug: bool) -> LevelFilter {
    match std::env::var(LOG_LEVEL_ENV) {
        Ok(val) => parse_log_level(&val).unwrap_or_else(|| {
            eprintln!(
                "Warning: Invalid {} '{}', falling back to default",
                LOG_LEVEL_ENV, val
            );
            default_level(is_debug)
        }),
        Err(_) => default_level(is_debug),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the level flag when
/// set, so per-module directives stay available.
pub fn init_logging(is_debug: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(resolve_default_level(is_debug).into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
