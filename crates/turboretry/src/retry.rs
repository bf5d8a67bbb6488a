//! The retry loop.
//!
//! [`retry`] blocks the calling thread between attempts; [`retry_async`] does
//! the same on a tokio runtime. Both follow one contract:
//!
//! 1. Invoke the operation. Success returns immediately and earlier failures
//!    are dropped.
//! 2. A failure is recorded. On the last allowed attempt the loop stops right
//!    away without sleeping or consulting the predicate.
//! 3. Otherwise the conditional-retry predicate is asked; `false` stops the
//!    loop with the failures collected so far.
//! 4. Otherwise the loop sleeps for [`BackoffPolicy::compute_delay`] and tries
//!    again.
//!
//! [`BackoffPolicy::compute_delay`]: crate::backoff::BackoffPolicy::compute_delay

use std::future::Future;
use std::time::Duration;

use crate::config::{RetryConfig, RetryOption};
use crate::error::AggregatedFailure;

/// Upper bound on the failure buffer reserved up front.
const MAX_PREALLOCATED_FAILURES: usize = 64;

/// What the loop should do after a failed attempt.
enum Step {
    Sleep(Duration),
    Stop,
}

/// Record a failure and decide whether another attempt follows.
fn after_failure<E>(
    config: &RetryConfig<E>,
    attempt: u32,
    error: E,
    failures: &mut Vec<E>,
) -> Step {
    let final_attempt = attempt >= config.attempts().saturating_sub(1);
    let retryable = !final_attempt && config.conditional_retry().check(&error);
    failures.push(error);

    if final_attempt {
        #[cfg(feature = "tracing")]
        tracing::warn!(attempts = attempt + 1, "retry attempts exhausted");
        return Step::Stop;
    }

    if !retryable {
        #[cfg(feature = "tracing")]
        tracing::debug!(attempt, "failure is not retryable, giving up");
        return Step::Stop;
    }

    let delay = config.backoff().compute_delay(attempt);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        attempt,
        max_attempts = config.attempts(),
        ?delay,
        "attempt failed, retrying after delay"
    );

    Step::Sleep(delay)
}

fn failure_buffer<E>(config: &RetryConfig<E>) -> Vec<E> {
    let capacity = usize::try_from(config.attempts())
        .unwrap_or(MAX_PREALLOCATED_FAILURES)
        .min(MAX_PREALLOCATED_FAILURES);
    Vec::with_capacity(capacity)
}

/// Run `operation` under `config`, blocking the current thread between attempts.
///
/// Returns the first successful value, or every failure in attempt order when
/// attempts are exhausted or the conditional-retry predicate refuses a failure.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryConfig;
/// use turboretry::retry::retry;
/// use std::time::Duration;
///
/// let config = RetryConfig::builder()
///     .attempts(2)
///     .constant_backoff(Duration::from_millis(1))
///     .build();
///
/// let result = retry(|| Err::<(), _>("foo"), &config);
///
/// let failure = result.unwrap_err();
/// assert_eq!(failure.len(), 2);
/// assert_eq!(failure.to_string(), "foo; foo");
/// ```
pub fn retry<T, E, F>(mut operation: F, config: &RetryConfig<E>) -> Result<T, AggregatedFailure<E>>
where
    F: FnMut() -> Result<T, E>,
{
    let mut failures = failure_buffer(config);
    let mut attempt = 0;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) => match after_failure(config, attempt, err, &mut failures) {
                Step::Stop => return Err(AggregatedFailure::new(failures)),
                Step::Sleep(delay) => std::thread::sleep(delay),
            },
        }
        attempt += 1;
    }
}

/// Async version of [`retry`], sleeping with [`tokio::time::sleep`].
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryConfig;
/// use turboretry::retry::retry_async;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = RetryConfig::builder()
///     .constant_backoff(Duration::from_millis(1))
///     .build();
///
/// let calls = AtomicU32::new(0);
/// let calls = &calls;
/// let result = retry_async(
///     move || async move {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err(std::io::Error::other("retry me"))
///         } else {
///             Ok(42)
///         }
///     },
///     &config,
/// )
/// .await;
///
/// assert_eq!(result.unwrap(), 42);
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub async fn retry_async<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig<E>,
) -> Result<T, AggregatedFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = failure_buffer(config);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => match after_failure(config, attempt, err, &mut failures) {
                Step::Stop => return Err(AggregatedFailure::new(failures)),
                Step::Sleep(delay) => tokio::time::sleep(delay).await,
            },
        }
        attempt += 1;
    }
}

/// Resolve `options` on top of the defaults and run the blocking loop.
///
/// # Examples
///
/// ```rust
/// use turboretry::config::RetryOption;
/// use turboretry::retry::retry_with;
///
/// let result = retry_with(
///     || Err::<(), _>("foo"),
///     [RetryOption::ConditionalRetry((|_: &&str| false).into())],
/// );
///
/// assert_eq!(result.unwrap_err().len(), 1);
/// ```
pub fn retry_with<T, E, F, I>(operation: F, options: I) -> Result<T, AggregatedFailure<E>>
where
    F: FnMut() -> Result<T, E>,
    I: IntoIterator<Item = RetryOption<E>>,
{
    retry(operation, &RetryConfig::from_options(options))
}

impl<E> RetryConfig<E> {
    /// Run `operation` under this config, see [`retry`].
    pub fn run<T, F>(&self, operation: F) -> Result<T, AggregatedFailure<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        retry(operation, self)
    }

    /// Run `operation` under this config, see [`retry_async`].
    pub async fn run_async<T, F, Fut>(&self, operation: F) -> Result<T, AggregatedFailure<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        retry_async(operation, self).await
    }
}
