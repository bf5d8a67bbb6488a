//! Error types returned by the retry engine.

use std::error::Error;
use std::fmt;

/// Every failure collected by a retry loop that did not end in success.
///
/// Failures are stored in attempt order. A loop always makes at least one
/// attempt, so a failure returned by [`retry`](crate::retry::retry) is never
/// empty.
///
/// The rendered message joins each failure's message with `"; "`:
///
/// ```rust
/// use turboretry::error::AggregatedFailure;
///
/// let failure = AggregatedFailure::new(vec!["foo", "bar"]);
/// assert_eq!(failure.to_string(), "foo; bar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedFailure<E> {
    errors: Vec<E>,
}

impl<E> AggregatedFailure<E> {
    /// Wrap an ordered list of failures.
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// Number of failed attempts recorded.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures in attempt order.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Iterate over failures in attempt order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Failure of the first attempt.
    pub fn first(&self) -> Option<&E> {
        self.errors.first()
    }

    /// Failure of the last attempt made.
    pub fn last(&self) -> Option<&E> {
        self.errors.last()
    }

    /// Take ownership of the collected failures.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }
}

impl<E: fmt::Display> fmt::Display for AggregatedFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<E> Error for AggregatedFailure<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors.last().map(|e| e as &(dyn Error + 'static))
    }
}

impl<E> IntoIterator for AggregatedFailure<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a AggregatedFailure<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Errors raised while loading [`RetrySettings`](crate::settings::RetrySettings).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    /// An environment variable was present but could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        var: String,
        /// Raw value that failed to parse.
        value: String,
        /// Parser error message.
        reason: String,
    },

    /// An environment variable contained non-UTF-8 data.
    #[error("{var} is not valid unicode")]
    NotUnicode {
        /// Name of the offending variable.
        var: String,
    },
}
