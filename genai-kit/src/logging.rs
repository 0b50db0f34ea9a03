//! Log output setup.
//!
//! The library only emits `tracing` events. Applications that want them on
//! stderr call [`init`] (or [`init_with_config`]) once at startup.

use crate::config::{debug_enabled, ServiceConfig, DEBUG_ENV};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Error returned when a global subscriber is already installed or the
/// filter does not parse.
pub type LoggingError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `genai_kit=debug`.
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl LogConfig {
    /// `debug` when `GEMINI_SDK_DEBUG=1`, otherwise `info`.
    pub fn from_env() -> Self {
        let debug = debug_enabled(std::env::var(DEBUG_ENV).ok().as_deref());
        Self {
            level: default_level(debug).to_string(),
            json: false,
        }
    }

    /// Set the fallback filter.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

impl From<&ServiceConfig> for LogConfig {
    /// `debug` when the config asks for debug logging, otherwise `info`.
    fn from(config: &ServiceConfig) -> Self {
        Self {
            level: default_level(config.debug).to_string(),
            json: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install a fmt subscriber configured from the environment.
pub fn init() -> Result<(), LoggingError> {
    init_with_config(LogConfig::from_env())
}

/// Install a fmt subscriber whose level follows [`ServiceConfig::debug`].
pub fn init_for(config: &ServiceConfig) -> Result<(), LoggingError> {
    init_with_config(LogConfig::from(config))
}

/// Install a fmt subscriber. `RUST_LOG` takes precedence over `config.level`.
pub fn init_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
