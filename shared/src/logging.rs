//! Shared logging utilities for consistent tracing across the harness

use chrono::{DateTime, Utc};
use tracing_subscriber::{EnvFilter, fmt};

/// Default level when none is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter directive used by the harness binary
pub fn filter_directive(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or(DEFAULT_LOG_LEVEL);
    format!("harness={base_level},shared={base_level}")
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` wins over `log_level` when it is set, so a single run can be
/// turned up without touching the command line.
pub fn init_tracing(log_level: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    // try_init: tests and embedding callers may already have installed a subscriber
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for node-aware info logging
#[macro_export]
macro_rules! node_info {
    ($node:expr, $($arg:tt)*) => {
        tracing::info!(
            node = %$node,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware warning logging
#[macro_export]
macro_rules! node_warn {
    ($node:expr, $($arg:tt)*) => {
        tracing::warn!(
            node = %$node,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware error logging
#[macro_export]
macro_rules! node_error {
    ($node:expr, $($arg:tt)*) => {
        tracing::error!(
            node = %$node,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for node-aware debug logging
#[macro_export]
macro_rules! node_debug {
    ($node:expr, $($arg:tt)*) => {
        tracing::debug!(
            node = %$node,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}
