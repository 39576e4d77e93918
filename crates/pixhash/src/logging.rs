//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default filter directive (e.g. "info", "debug").
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout carries the move status lines)
/// - The RUST_LOG environment variable can override the log level
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        // JSON format for machine parsing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Pretty format for humans
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(
    config: &pixhash_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let (level, json_format) = resolve(config, verbose_override, json_logs_override);
    init(level, json_format);
}

/// Effective level and format: `--verbose` raises the level to at least debug.
fn resolve(
    config: &pixhash_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) -> (&str, bool) {
    let configured = config.logging.level.as_str();
    let level = if verbose_override && configured != "trace" {
        "debug"
    } else {
        configured
    };
    let json_format = json_logs_override || config.logging.format == "json";
    (level, json_format)
}
