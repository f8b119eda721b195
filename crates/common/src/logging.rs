//! Logging and tracing initialization.
//!
//! Batch workers log from pool threads, so the human-readable format keeps
//! thread ids on to tell interleaved item logs apart.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

impl LoggingConfig {
    /// Level preset used by the CLI `--verbose` switch.
    pub fn for_verbosity(verbose: bool, json: bool) -> Self {
        Self {
            level: if verbose { "debug" } else { "info" }.to_string(),
            json,
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed (tests, embedding
/// hosts); the existing one is kept.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = fmt::Subscriber::builder().with_env_filter(build_filter(config));

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_target(true)
                .with_thread_ids(true)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    installed.is_ok()
}
