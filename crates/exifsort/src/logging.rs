//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem with either human-readable or JSON output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `level` - Default filter when `RUST_LOG` is not set.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for the `--json` report)
/// - The RUST_LOG environment variable can override the log level
/// - Stage summaries stay visible at every level
pub fn init(level: &str, json_format: bool) {
    let filter = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .and_then(|env| EnvFilter::try_new(directives(&env)).ok())
        .unwrap_or_else(|| EnvFilter::new(directives(level)));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
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

/// Initialize logging with settings from the config file and CLI overrides.
pub fn init_from_config(
    config: &exifsort_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(
        effective_level(&config.logging.level, verbose_override),
        json_format,
    );
}

/// Append the summary target at `info` to a filter string.
fn directives(base: &str) -> String {
    let summary = format!("{}=info", exifsort_core::SUMMARY_TARGET);
    if base.trim().is_empty() {
        summary
    } else {
        format!("{base},{summary}")
    }
}

/// `--verbose` raises the level to debug but never lowers trace.
fn effective_level(configured: &str, verbose: bool) -> &str {
    match (verbose, configured) {
        (true, "trace") => "trace",
        (true, _) => "debug",
        (false, level) => level,
    }
}
