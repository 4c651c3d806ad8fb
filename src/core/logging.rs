//! Structured logging for the signer
//!
//! Uses `tracing` with a `tracing-subscriber` formatter:
//! - JSON output by default (for log aggregation)
//! - Pretty output with `LOG_FORMAT=pretty`
//! - Level filter from `RUST_LOG`
//!
//! Private keys are never logged. Signatures and hashes are public data but
//! are shortened with `sanitize_signature` to keep log lines compact.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `stark_price_signer=info` | Log level filter |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, prelude::*, EnvFilter};

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "stark_price_signer=info";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "stark_price_signer=debug")
    pub level_filter: String,
    /// Use pretty format instead of JSON
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("pretty"))
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize logging from the environment; later calls are no-ops
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Initialize logging with an explicit configuration; later calls are no-ops
pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    // Logs go to stderr so command output on stdout stays machine-readable
    let result = if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(ts_fmt::layer().pretty().with_target(true).with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .try_init()
    };

    if result.is_err() {
        // Another subscriber was installed by the host process
        LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
    }
}

/// Shorten a hex signature / hash to its first 8 characters.
pub fn sanitize_signature(sig: &str) -> String {
    match sig.get(..8) {
        Some(prefix) if sig.len() > 12 => format!("{}...", prefix),
        _ => "REDACTED".to_string(),
    }
}
