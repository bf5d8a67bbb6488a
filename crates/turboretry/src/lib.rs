#![deny(unsafe_code)]
#![warn(missing_docs)]

//! A generic retry engine.
//!
//! Wrap any fallible operation and `turboretry` re-invokes it until it
//! succeeds, the attempt budget runs out, or a caller-supplied predicate
//! decides a failure is not worth retrying:
//!
//! - **Bounded attempts** - `attempts` counts total invocations, not retries
//! - **Exponential backoff with jitter** via [`BackoffPolicy`](backoff::BackoffPolicy),
//!   overflow-safe for any factor and attempt index
//! - **Constant backoff** for fixed-interval polling
//! - **Conditional retries** via [`ConditionalRetry`](predicate::ConditionalRetry)
//! - **Aggregated failures** - every attempt's error, in order, in
//!   [`AggregatedFailure`](error::AggregatedFailure)
//! - **Blocking and async loops** ([`retry`](retry::retry) and
//!   [`retry_async`](retry::retry_async))
//!
//! Bad configuration never fails: out-of-range values are normalized to the
//! defaults (5 attempts, 1s initial delay, 10s max delay, factor 2).
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use turboretry::prelude::*;
//! use std::time::Duration;
//!
//! let config = RetryConfig::builder()
//!     .attempts(3)
//!     .exponential_backoff(Duration::from_millis(1), Duration::from_millis(10), None)
//!     .conditional_retry(io_transient)
//!     .build();
//!
//! let result = retry(
//!     || Err::<(), _>(std::io::Error::from(std::io::ErrorKind::NotFound)),
//!     &config,
//! );
//!
//! // NotFound is not transient, so only one attempt was made
//! assert_eq!(result.unwrap_err().len(), 1);
//! ```
//!
//! # Feature flags
//!
//! - `tracing` - emit `tracing` events for failed attempts, scheduled delays,
//!   and give-ups.

pub mod backoff;
pub mod config;
pub mod error;
pub mod predicate;
pub mod retry;
pub mod settings;


/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use turboretry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::BackoffPolicy;
    pub use crate::config::{RetryConfig, RetryConfigBuilder, RetryOption};
    pub use crate::error::AggregatedFailure;
    pub use crate::predicate::{ConditionalRetry, io_transient};
    pub use crate::retry::{retry, retry_async, retry_with};
    pub use crate::settings::RetrySettings;
}
