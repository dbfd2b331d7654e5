//! Process-wide `tracing` setup for the API binary.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives appended to a bare level so HTTP plumbing stays quiet at `debug`.
const QUIET_DEPENDENCIES: &str = "hyper=warn,tower=warn";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber already installed")]
    Install(#[from] TryInitError),
}

/// Filter used when `RUST_LOG` is unset. A bare level such as `debug` gets the dependency
/// directives appended; anything with its own `target=level` pairs is used as written.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    let level = config.log_level.trim();
    let directives = if level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{QUIET_DEPENDENCIES}")
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
        value: config.log_level.clone(),
        source,
    })
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level when present.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(config)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_ansi(false),
        )
        .try_init()?;
    Ok(())
}
