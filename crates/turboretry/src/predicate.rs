//! Conditional retry predicates.

use std::fmt;
use std::io;
use std::sync::Arc;

/// Decides, per failure, whether the retry loop may keep going.
///
/// `true` permits another attempt, `false` stops the loop immediately. The
/// predicate is shared behind an [`Arc`], so cloning a config is cheap and the
/// same policy can be used from several threads at once.
///
/// # Examples
///
/// ```rust
/// use turboretry::predicate::ConditionalRetry;
///
/// let only_network = ConditionalRetry::new(|err: &String| err.contains("network"));
///
/// assert!(only_network.check(&"network unreachable".to_string()));
/// assert!(!only_network.check(&"auth failed".to_string()));
/// ```
pub struct ConditionalRetry<E> {
    predicate: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> ConditionalRetry<E> {
    /// Wrap a predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Retry on every failure.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Never retry; the first failure ends the loop.
    pub fn never() -> Self {
        Self::new(|_| false)
    }

    /// Evaluate the predicate against a failure.
    pub fn check(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

impl<E> Clone for ConditionalRetry<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<E> Default for ConditionalRetry<E> {
    fn default() -> Self {
        Self::always()
    }
}

impl<E> fmt::Debug for ConditionalRetry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalRetry").finish_non_exhaustive()
    }
}

impl<E, F> From<F> for ConditionalRetry<E>
where
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    fn from(predicate: F) -> Self {
        Self::new(predicate)
    }
}

/// Retry only I/O failures that are likely to be transient.
///
/// Timeouts are never retried: an operation that already ran out of time is
/// treated as cancelled. Connection-level and temporary failures are retried.
/// Anything else (not found, permission denied, invalid data, ...) is refused.
///
/// # Examples
///
/// ```rust
/// use std::io;
/// use turboretry::predicate::{io_transient, ConditionalRetry};
///
/// let policy: ConditionalRetry<io::Error> = ConditionalRetry::new(io_transient);
///
/// assert!(policy.check(&io::Error::from(io::ErrorKind::ConnectionReset)));
/// assert!(!policy.check(&io::Error::from(io::ErrorKind::TimedOut)));
/// ```
pub fn io_transient(error: &io::Error) -> bool {
    use io::ErrorKind::*;

    matches!(
        error.kind(),
        ConnectionRefused
            | ConnectionReset
            | ConnectionAborted
            | NotConnected
            | BrokenPipe
            | WouldBlock
            | Interrupted
            | UnexpectedEof
    )
}
