//! Tracing bootstrap
//!
//! `RUST_LOG` wins over the configured level when it is set.

use passage_domain::LoggingSettings;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter from `RUST_LOG`, falling back to `settings.level`
///
/// # Errors
/// Returns `LoggingError::InvalidFilter` when the configured level does not
/// parse and `RUST_LOG` is unset.
pub fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level).map_err(|source| LoggingError::InvalidFilter {
        directive: settings.level.clone(),
        source,
    })
}

/// Install the global subscriber
///
/// # Errors
/// Returns `LoggingError` on an invalid filter or when called twice.
pub fn init(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let filter = env_filter(settings)?;

    let layer = if settings.json {
        fmt::layer().json().with_current_span(true).with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).try_init()?;

    tracing::debug!(level = %settings.level, json = settings.json, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for the logging bootstrap.

    use super::*;

    /// Validates the filter parsing scenario.
    ///
    /// Assertions:
    /// - A malformed directive is rejected when `RUST_LOG` is unset
    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = LoggingSettings { level: "passage=notalevel".to_string(), json: false };

        assert!(matches!(env_filter(&settings), Err(LoggingError::InvalidFilter { .. })));
    }

    /// Validates the default level scenario.
    ///
    /// Assertions:
    /// - The default level parses
    #[test]
    fn test_default_level_parses() {
        assert!(env_filter(&LoggingSettings::default()).is_ok());
    }
}
