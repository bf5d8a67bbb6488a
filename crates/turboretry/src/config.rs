//! Retry configuration: defaults, ordered overrides, and the resolved config.

use std::fmt;
use std::time::Duration;

use crate::backoff::BackoffPolicy;
use crate::predicate::ConditionalRetry;

/// Default number of attempts (total invocations, not additional retries).
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default upper bound on any delay between attempts.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default exponential growth factor.
pub const DEFAULT_FACTOR: f64 = 2.0;

/// A single configuration override.
///
/// Options are applied in order on top of the defaults; when two options
/// touch the same fields the later one wins. Each backoff option replaces the
/// whole backoff policy (initial delay, max delay, and factor together).
///
/// Out-of-range values are normalized instead of rejected, so applying any
/// list of options always produces a usable config.
pub enum RetryOption<E> {
    /// Total number of attempts. Values below 1 fall back to [`DEFAULT_ATTEMPTS`].
    Attempts(i64),
    /// Wait the same delay between every attempt.
    ConstantBackoff(Duration),
    /// Exponentially growing delay, see [`BackoffPolicy::exponential`].
    ExponentialBackoff {
        /// Delay before the first retry.
        initial_delay: Duration,
        /// Upper bound on any delay.
        max_delay: Duration,
        /// Growth factor; `None` uses [`DEFAULT_FACTOR`].
        factor: Option<f64>,
    },
    /// Predicate deciding whether a failure may be retried.
    ConditionalRetry(ConditionalRetry<E>),
}

impl<E> Clone for RetryOption<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Attempts(n) => Self::Attempts(*n),
            Self::ConstantBackoff(delay) => Self::ConstantBackoff(*delay),
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                factor,
            } => Self::ExponentialBackoff {
                initial_delay: *initial_delay,
                max_delay: *max_delay,
                factor: *factor,
            },
            Self::ConditionalRetry(predicate) => Self::ConditionalRetry(predicate.clone()),
        }
    }
}

impl<E> fmt::Debug for RetryOption<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempts(n) => f.debug_tuple("Attempts").field(n).finish(),
            Self::ConstantBackoff(delay) => f.debug_tuple("ConstantBackoff").field(delay).finish(),
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                factor,
            } => f
                .debug_struct("ExponentialBackoff")
                .field("initial_delay", initial_delay)
                .field("max_delay", max_delay)
                .field("factor", factor)
                .finish(),
            Self::ConditionalRetry(predicate) => {
                f.debug_tuple("ConditionalRetry").field(predicate).finish()
            }
        }
    }
}

/// Normalize a requested attempt count.
fn normalize_attempts(attempts: i64) -> u32 {
    if attempts < 1 {
        return DEFAULT_ATTEMPTS;
    }
    u32::try_from(attempts).unwrap_or(u32::MAX)
}

/// Fully resolved retry configuration for one invocation of the retry loop.
///
/// Built once from the defaults plus an ordered list of [`RetryOption`]s and
/// never mutated afterwards; the loop only reads it.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::<std::io::Error>::builder()
///     .attempts(3)
///     .exponential_backoff(Duration::from_millis(100), Duration::from_secs(2), None)
///     .build();
///
/// assert_eq!(config.attempts(), 3);
/// assert_eq!(config.backoff().max_delay(), Duration::from_secs(2));
/// ```
pub struct RetryConfig<E> {
    attempts: u32,
    backoff: BackoffPolicy,
    conditional_retry: ConditionalRetry<E>,
}

impl<E> RetryConfig<E> {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::default()
    }

    /// Resolve a config by applying `options` in order on top of the defaults.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = RetryOption<E>>,
    {
        let mut config = Self::default();
        for option in options {
            config.apply(option);
        }
        config
    }

    fn apply(&mut self, option: RetryOption<E>) {
        match option {
            RetryOption::Attempts(n) => self.attempts = normalize_attempts(n),
            RetryOption::ConstantBackoff(delay) => self.backoff = BackoffPolicy::constant(delay),
            RetryOption::ExponentialBackoff {
                initial_delay,
                max_delay,
                factor,
            } => self.backoff = BackoffPolicy::exponential(initial_delay, max_delay, factor),
            RetryOption::ConditionalRetry(predicate) => self.conditional_retry = predicate,
        }
    }

    /// Total number of attempts, always at least 1.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Timing policy between attempts.
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Predicate consulted after each non-final failure.
    pub fn conditional_retry(&self) -> &ConditionalRetry<E> {
        &self.conditional_retry
    }
}

impl<E> Default for RetryConfig<E> {
    /// Defaults:
    /// - `attempts`: 5
    /// - `initial_delay`: 1s
    /// - `max_delay`: 10s
    /// - `factor`: 2.0
    /// - `conditional_retry`: always retry
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: BackoffPolicy::default(),
            conditional_retry: ConditionalRetry::always(),
        }
    }
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            attempts: self.attempts,
            backoff: self.backoff,
            conditional_retry: self.conditional_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("attempts", &self.attempts)
            .field("backoff", &self.backoff)
            .field("conditional_retry", &self.conditional_retry)
            .finish()
    }
}

/// Builder for configuring [`RetryConfig`].
///
/// Each call records an override; [`build`](Self::build) applies them in call
/// order, so the last backoff call wins.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::<String>::builder()
///     .exponential_backoff(Duration::from_secs(1), Duration::from_secs(30), Some(3.0))
///     .constant_backoff(Duration::from_millis(10))
///     .conditional_retry(|err: &String| !err.starts_with("fatal"))
///     .build();
///
/// assert!(config.backoff().is_constant());
/// ```
pub struct RetryConfigBuilder<E> {
    options: Vec<RetryOption<E>>,
}

impl<E> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
        }
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Set the total number of attempts.
    ///
    /// Default: 5. Values below 1 fall back to the default.
    pub fn attempts(self, attempts: i64) -> Self {
        self.option(RetryOption::Attempts(attempts))
    }

    /// Wait a constant `delay` between attempts.
    pub fn constant_backoff(self, delay: Duration) -> Self {
        self.option(RetryOption::ConstantBackoff(delay))
    }

    /// Wait an exponentially growing, jittered delay between attempts.
    ///
    /// Default: 1s initial, 10s max, factor 2.
    pub fn exponential_backoff(
        self,
        initial_delay: Duration,
        max_delay: Duration,
        factor: Option<f64>,
    ) -> Self {
        self.option(RetryOption::ExponentialBackoff {
            initial_delay,
            max_delay,
            factor,
        })
    }

    /// Only retry failures for which `predicate` returns `true`.
    ///
    /// Default: retry every failure.
    pub fn conditional_retry(self, predicate: impl Into<ConditionalRetry<E>>) -> Self {
        self.option(RetryOption::ConditionalRetry(predicate.into()))
    }

    /// Record an arbitrary option.
    pub fn option(mut self, option: RetryOption<E>) -> Self {
        self.options.push(option);
        self
    }

    /// Record several options, preserving their order.
    pub fn options(mut self, options: impl IntoIterator<Item = RetryOption<E>>) -> Self {
        self.options.extend(options);
        self
    }

    /// Build the [`RetryConfig`].
    pub fn build(self) -> RetryConfig<E> {
        RetryConfig::from_options(self.options)
    }
}
