//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::{DEFAULT_FACTOR, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY};

/// Largest nanosecond count that is safe to convert into a [`Duration`].
///
/// Kept a little below `i64::MAX` so float rounding near the boundary can
/// never produce a value that wraps.
const MAX_SAFE_NANOS: f64 = (i64::MAX - 512) as f64;

/// Timing policy used between retry attempts.
///
/// The unjittered envelope grows exponentially: `initial_delay * factor^attempt`.
/// The actual delay is drawn uniformly between `initial_delay` and the envelope,
/// then capped at `max_delay`.
///
/// # Mathematical Formula
///
/// For attempt `n` (0-indexed, `n = 0` is the wait before the second try):
/// ```text
/// envelope = initial_delay * (factor ^ n)
/// jittered = initial_delay + random[0, 1) * (envelope - initial_delay)
/// delay    = clamp(jittered, initial_delay, max_delay)
/// ```
///
/// Attempt 0 therefore always waits exactly `initial_delay`, and a constant
/// policy (`factor == 1`) always waits `initial_delay`.
///
/// # Examples
///
/// ```rust
/// use turboretry::backoff::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::exponential(
///     Duration::from_millis(100),
///     Duration::from_secs(5),
///     Some(3.0),
/// );
///
/// assert_eq!(policy.compute_delay(0), Duration::from_millis(100));
/// assert!(policy.compute_delay(10) <= Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    initial_delay: Duration,
    max_delay: Duration,
    factor: f64,
}

impl BackoffPolicy {
    /// A constant delay between every attempt.
    ///
    /// Both the initial and maximum delay are set to `delay` and the growth
    /// factor is fixed at exactly 1.
    pub fn constant(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            factor: 1.0,
        }
    }

    /// An exponentially growing delay.
    ///
    /// Inputs are normalized rather than rejected:
    /// - a missing, non-finite, or non-growing (`<= 1`) factor becomes
    ///   [`DEFAULT_FACTOR`]
    /// - an `initial_delay` above `max_delay` is clamped down to `max_delay`
    ///   (so `max_delay == 0` forces `initial_delay == 0`)
    pub fn exponential(initial_delay: Duration, max_delay: Duration, factor: Option<f64>) -> Self {
        let factor = match factor {
            Some(f) if f.is_finite() && f > 1.0 => f,
            _ => DEFAULT_FACTOR,
        };

        Self {
            initial_delay: initial_delay.min(max_delay),
            max_delay,
            factor,
        }
    }

    /// Delay used before the first retry.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Upper bound on any computed delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Exponential growth factor (exactly 1 for constant policies).
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Whether this policy waits the same amount before every retry.
    pub fn is_constant(&self) -> bool {
        self.factor == 1.0
    }

    /// Compute the delay to wait after the failure of attempt `attempt`.
    ///
    /// Uses the thread-local random number generator for jitter.
    pub fn compute_delay(&self, attempt: u32) -> Duration {
        self.compute_delay_with(attempt, &mut rand::thread_rng())
    }

    /// Compute the delay for `attempt` using the provided random source.
    ///
    /// The overflow guard is checked on the floating-point value *before*
    /// converting to a [`Duration`]; anything past the safe range resolves to
    /// `max_delay`.
    pub fn compute_delay_with<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        // envelope == initial_delay, skip the lossy float round trip
        if attempt == 0 || self.is_constant() {
            return self.initial_delay;
        }

        let initial = self.initial_delay.as_nanos() as f64;
        let envelope = initial * self.factor.powf(f64::from(attempt));

        let r: f64 = rng.r#gen();
        let jittered = initial + r * (envelope - initial);

        if !jittered.is_finite() || jittered > MAX_SAFE_NANOS {
            return self.max_delay;
        }

        // f64 cannot hold every nanosecond count, so rounding may land just
        // below the initial delay
        Duration::from_nanos(jittered as u64)
            .max(self.initial_delay)
            .min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    /// Exponential backoff starting at 1s, capped at 10s, doubling each time.
    fn default() -> Self {
        Self::exponential(DEFAULT_INITIAL_DELAY, DEFAULT_MAX_DELAY, Some(DEFAULT_FACTOR))
    }
}
