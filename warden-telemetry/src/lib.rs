//! Tracing configuration for processes that embed warden policy stores.
//!
//! The policy crate only emits `tracing` events. Binaries and tests decide
//! where those go by installing a subscriber through [`init_tracing`].

#![warn(missing_docs, clippy::pedantic)]

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "WARDEN_LOG";
/// Environment variable toggling ANSI colours (`0` or `false` disables).
pub const LOG_ANSI_ENV: &str = "WARDEN_LOG_ANSI";

const DEFAULT_FILTER: &str = "info";

/// Errors surfaced while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter `{filter}`: {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser explanation.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {reason}")]
    AlreadyInstalled {
        /// Explanation reported by `tracing-subscriber`.
        reason: String,
    },
}

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Subscriber settings, loadable from the environment or any serde source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    filter: String,
    with_target: bool,
    ansi: bool,
}

impl TelemetryConfig {
    /// Creates a configuration with the supplied filter directive.
    #[must_use]
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    /// Reads [`LOG_ENV`] and [`LOG_ANSI_ENV`], falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_ENV).filter(|value| !value.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(ansi) = lookup(LOG_ANSI_ENV) {
            config.ansi = !matches!(ansi.trim().to_ascii_lowercase().as_str(), "0" | "false");
        }
        config
    }

    /// Shows event targets in formatted output.
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Enables or disables ANSI colours.
    #[must_use]
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Returns the filter directive.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns true when event targets are printed.
    #[must_use]
    pub fn target_enabled(&self) -> bool {
        self.with_target
    }

    /// Returns true when ANSI colours are enabled.
    #[must_use]
    pub fn ansi_enabled(&self) -> bool {
        self.ansi
    }

    /// Parses the filter directive.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidFilter`] when the directive is malformed.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|err| TelemetryError::InvalidFilter {
            filter: self.filter.clone(),
            reason: err.to_string(),
        })
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.into(),
            with_target: false,
            ansi: true,
        }
    }
}

/// Installs a formatted, filtered subscriber as the global default.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a malformed directive and
/// [`TelemetryError::AlreadyInstalled`] when a global subscriber exists.
pub fn init_tracing(config: &TelemetryConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled {
            reason: err.to_string(),
        })?;
    debug!(filter = config.filter(), "tracing initialised");
    Ok(())
}
