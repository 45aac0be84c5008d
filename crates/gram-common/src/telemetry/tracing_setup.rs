//! Tracing bootstrap
//!
//! One fmt layer over an env-filter: readable output while developing, JSON
//! lines in production. `RUST_LOG` always wins over the preset filter.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output shape of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-oriented output for a terminal
    Pretty,
    /// One JSON object per line
    Json,
}

/// Subscriber settings, usually picked by [`TracingConfig::from_env`]
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Fallback filter directive when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
    /// Emit span close events, which carry `#[instrument]` span timings
    pub span_lifecycle: bool,
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            format: LogFormat::Pretty,
            span_lifecycle: true,
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
            span_lifecycle: false,
        }
    }

    /// Preset for the current `APP_ENV`
    ///
    /// Loads `.env` first so an `APP_ENV` or `RUST_LOG` set there is seen
    /// before the subscriber goes up.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        match std::env::var("APP_ENV").map(|s| s.to_lowercase()).as_deref() {
            Ok("production" | "staging") => Self::production(),
            _ => Self::development(),
        }
    }
}

/// Install the global subscriber
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let span_events = if config.span_lifecycle {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_events(span_events),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_span_events(span_events))
            .try_init(),
    };

    installed.map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}
