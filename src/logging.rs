//! # Structured Logging Module
//!
//! Environment-aware structured logging: console output always, plus an
//! optional JSON file per process for post-mortem debugging of the
//! publish and reconcile paths.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{detect_environment, LoggingConfig};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging (only the first call has any effect)
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = detect_environment();
        let log_level = resolve_log_level(config.level.as_deref(), &environment);

        let pid = process::id();
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let log_filename = format!("{}.{}.{}.log", environment, pid, timestamp);
        let log_dir = PathBuf::from(&config.directory);

        let mut file_setup_error = None;
        let file_writer = if config.json_file {
            match fs::create_dir_all(&log_dir) {
                Ok(()) => {
                    let appender = tracing_appender::rolling::never(&log_dir, &log_filename);
                    Some(tracing_appender::non_blocking(appender))
                }
                Err(e) => {
                    file_setup_error = Some(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        let (file_layer, guard) = match file_writer {
            Some((writer, guard)) => (
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_level(true)
                        .with_ansi(false)
                        .json()
                        .with_filter(EnvFilter::new(log_level.clone())),
                ),
                Some(guard),
            ),
            None => (None, None),
        };

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(EnvFilter::new(log_level.clone())),
            )
            .with(file_layer);

        // A global subscriber may already be set (tests, embedding binaries)
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        if let Some(error) = file_setup_error {
            tracing::warn!(
                directory = %log_dir.display(),
                error = %error,
                "Log directory unavailable, file logging disabled"
            );
        }

        tracing::info!(
            pid = pid,
            environment = %environment,
            level = %log_level,
            log_file = ?guard.as_ref().map(|_| log_dir.join(&log_filename).display().to_string()),
            "🔧 STRUCTURED LOGGING: Initialized"
        );

        // The writer flushes only while its guard lives
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }
    });
}

/// Configured level, then `RUST_LOG`, then the environment default
fn resolve_log_level(configured: Option<&str>, environment: &str) -> String {
    if let Some(level) = configured.filter(|l| !l.trim().is_empty()) {
        return level.to_string();
    }
    if let Ok(level) = std::env::var("RUST_LOG") {
        if !level.trim().is_empty() {
            return level;
        }
    }
    default_log_level(environment).to_string()
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for relay operations (publish, reconcile, mark read, delete)
pub fn log_relay_operation(
    operation: &str,
    message_id: Option<u64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        message_id = message_id,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "💬 RELAY_OPERATION"
    );
}

/// Log structured data for broker operations
pub fn log_broker_operation(operation: &str, queue: &str, status: &str, details: Option<&str>) {
    tracing::info!(
        operation = %operation,
        queue = %queue,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🐇 BROKER_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
