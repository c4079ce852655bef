//! Tracing subscriber setup.
//!
//! Logs go to stderr; stdout carries the MCP frames. Records emitted through
//! the `log` facade by the library crates are bridged into tracing.

use tracing_subscriber::{EnvFilter, fmt};

use ado_mcp_common::{Config, LogFormat};

/// Maps a configured level name to an `EnvFilter` directive.
///
/// Unknown names fall back to `info`.
#[must_use]
pub fn filter_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARN" | "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.log_level)));

    match config.log_format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .init();
        }
        LogFormat::Text => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .init();
        }
    }
}
