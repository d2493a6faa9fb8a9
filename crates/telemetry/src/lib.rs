//! Logging setup for objstore binaries.
//!
//! Structured logging through `tracing-subscriber`, either JSON or a compact
//! human-readable format. Logs go to stderr so stdout stays free for command
//! output.

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: String,
    /// Use JSON log format
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            json_logs: false,
        }
    }
}

/// Parse a log level name, case-insensitively.
#[must_use]
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// Directives that keep SDK and HTTP internals quiet at the default level.
const DEFAULT_DIRECTIVES: [&str; 5] = [
    "aws_smithy_runtime=warn",
    "aws_config=warn",
    "aws_sdk_s3=info",
    "hyper=info",
    "h2=info",
];

/// Build the filter: configured level plus quieter SDK internals.
///
/// `overrides` (the value of `RUST_LOG`) is applied last, so its directives
/// replace the defaults for the same target. Malformed directives are skipped.
fn build_filter(level: Level, overrides: Option<&str>) -> EnvFilter {
    let mut filter = EnvFilter::default().add_directive(level.into());
    let overrides = overrides
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|directive| !directive.is_empty());
    for directive in DEFAULT_DIRECTIVES.into_iter().chain(overrides) {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Setup the logging stack.
///
/// Unknown level names fall back to INFO.
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn setup_telemetry(config: &TelemetryConfig) {
    let level = parse_level(&config.log_level).unwrap_or(Level::INFO);
    let overrides = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
            .with_writer(std::io::stderr)
            .compact()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(build_filter(level, overrides.as_deref()))
        .with(fmt_layer)
        .init();
}
