//! Tracing initialization and subscriber setup.
//!
//! Configures a `tracing-subscriber` registry with an environment-aware filter
//! and a human-readable or JSON formatter writing to stderr.

use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Resolves the filter directive: `RUST_LOG` wins, then `trace_level`, then `"info"`.
fn build_env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initializes the global tracing subscriber.
///
/// # Trace Level Resolution
///
/// Level is determined by:
/// 1. `RUST_LOG` environment variable
/// 2. `config.trace_level` if set and valid
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// Idempotent: only the first call in a process installs a subscriber; later
/// calls, or a subscriber installed by the embedder, are left alone.
///
/// # Example
///
/// ```
/// use trackboard::observability::init_tracing;
/// use trackboard::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = build_env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(json = config.json_logs, "tracing initialized");
    }
}
