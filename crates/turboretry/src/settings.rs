//! Externally supplied retry settings.
//!
//! [`RetrySettings`] is a plain, serde-friendly mirror of the retry options
//! using signed integer milliseconds, so it can be read from config files or
//! the environment. Out-of-range values are normalized when the settings are
//! turned into options, never rejected.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::config::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, RetryConfig, RetryOption};
use crate::error::SettingsError;

/// Default environment variable prefix used by [`RetrySettings::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "RETRY";

/// Retry settings as they appear in configuration sources.
///
/// All fields are optional; anything left unset keeps the library default.
///
/// # Examples
///
/// ```rust
/// use turboretry::settings::RetrySettings;
/// use std::time::Duration;
///
/// let settings = RetrySettings {
///     attempts: Some(3),
///     initial_delay_ms: Some(250),
///     max_delay_ms: Some(-1), // normalized to the 10s default
///     ..Default::default()
/// };
///
/// let config = settings.into_config::<std::io::Error>();
/// assert_eq!(config.attempts(), 3);
/// assert_eq!(config.backoff().max_delay(), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total number of attempts.
    pub attempts: Option<i64>,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: Option<i64>,
    /// Upper bound on any delay, in milliseconds. Ignored when `constant` is set.
    pub max_delay_ms: Option<i64>,
    /// Exponential growth factor. Ignored when `constant` is set.
    pub factor: Option<f64>,
    /// Use a constant delay of `initial_delay_ms` instead of exponential growth.
    pub constant: bool,
}

/// Convert signed milliseconds into a delay, falling back when negative.
fn millis_or(ms: Option<i64>, default: Duration) -> Duration {
    match ms {
        Some(ms) if ms >= 0 => Duration::from_millis(ms.unsigned_abs()),
        _ => default,
    }
}

impl RetrySettings {
    /// Load settings from `RETRY_*` environment variables.
    ///
    /// See [`from_env_with_prefix`](Self::from_env_with_prefix).
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Load settings from environment variables named `{prefix}_*`.
    ///
    /// This will look for:
    /// - `{prefix}_ATTEMPTS`
    /// - `{prefix}_INITIAL_DELAY_MS`
    /// - `{prefix}_MAX_DELAY_MS`
    /// - `{prefix}_FACTOR`
    /// - `{prefix}_CONSTANT` (`true`/`false`)
    ///
    /// Missing variables leave the field unset. A variable that is present but
    /// cannot be parsed is an error.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            attempts: read_var(prefix, "ATTEMPTS")?,
            initial_delay_ms: read_var(prefix, "INITIAL_DELAY_MS")?,
            max_delay_ms: read_var(prefix, "MAX_DELAY_MS")?,
            factor: read_var(prefix, "FACTOR")?,
            constant: read_var(prefix, "CONSTANT")?.unwrap_or(false),
        })
    }

    /// Translate these settings into an ordered list of overrides.
    ///
    /// Negative delays normalize to the defaults (1s initial, 10s max).
    pub fn options<E>(&self) -> Vec<RetryOption<E>> {
        let mut options = Vec::with_capacity(2);

        if let Some(attempts) = self.attempts {
            options.push(RetryOption::Attempts(attempts));
        }

        if self.constant {
            options.push(RetryOption::ConstantBackoff(millis_or(
                self.initial_delay_ms,
                DEFAULT_INITIAL_DELAY,
            )));
        } else if self.initial_delay_ms.is_some()
            || self.max_delay_ms.is_some()
            || self.factor.is_some()
        {
            options.push(RetryOption::ExponentialBackoff {
                initial_delay: millis_or(self.initial_delay_ms, DEFAULT_INITIAL_DELAY),
                max_delay: millis_or(self.max_delay_ms, DEFAULT_MAX_DELAY),
                factor: self.factor,
            });
        }

        options
    }

    /// Resolve these settings into a [`RetryConfig`] that retries every failure.
    pub fn into_config<E>(self) -> RetryConfig<E> {
        RetryConfig::from_options(self.options())
    }
}

fn read_var<T>(prefix: &str, suffix: &str) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let var = format!("{}_{}", prefix, suffix);
    match env::var(&var) {
        Ok(value) => {
            let trimmed = value.trim();
            trimmed
                .parse()
                .map(Some)
                .map_err(|e: T::Err| SettingsError::InvalidValue {
                    var,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(SettingsError::NotUnicode { var }),
    }
}
