//! End-to-end retry scenarios against the public API.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use turboretry::prelude::*;

/// Simulated backend that fails a fixed number of times before answering.
struct FlakyService {
    calls: AtomicU32,
    failures_before_success: u32,
    kind: io::ErrorKind,
}

impl FlakyService {
    fn new(failures_before_success: u32, kind: io::ErrorKind) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures_before_success,
            kind,
        }
    }

    fn call(&self) -> Result<&'static str, io::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures_before_success {
            Err(io::Error::new(self.kind, format!("call {} failed", call + 1)))
        } else {
            Ok("payload")
        }
    }

    async fn call_async(&self) -> Result<&'static str, io::Error> {
        tokio::task::yield_now().await;
        self.call()
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[test]
fn test_success_first_call_with_defaults() {
    let service = FlakyService::new(0, io::ErrorKind::ConnectionReset);

    let result = retry(|| service.call(), &RetryConfig::default());

    assert_eq!(result.unwrap(), "payload");
    assert_eq!(service.calls(), 1);
}

#[test]
fn test_constant_backoff_two_attempts_foo() {
    let result = retry_with(
        || Err::<(), _>(io::Error::other("foo")),
        [
            RetryOption::ConstantBackoff(Duration::from_millis(1)),
            RetryOption::Attempts(2),
        ],
    );

    let failure = result.unwrap_err();
    assert_eq!(failure.len(), 2);
    let messages: Vec<_> = failure.iter().map(ToString::to_string).collect();
    assert_eq!(messages, vec!["foo", "foo"]);
}

#[test]
fn test_exponential_backoff_two_attempts_foo() {
    let config = RetryConfig::builder()
        .attempts(2)
        .exponential_backoff(Duration::from_millis(1), Duration::from_secs(10), None)
        .conditional_retry(ConditionalRetry::always())
        .build();

    let result = retry(|| Err::<(), _>(io::Error::other("foo")), &config);

    assert_eq!(result.unwrap_err().to_string(), "foo; foo");
}

#[test]
fn test_veto_returns_single_failure() {
    let config = RetryConfig::builder()
        .conditional_retry(|_: &io::Error| false)
        .build();

    let result = retry(|| Err::<(), _>(io::Error::other("foo")), &config);

    assert_eq!(result.unwrap_err().to_string(), "foo");
}

#[test]
fn test_transient_failures_recover() {
    let service = FlakyService::new(3, io::ErrorKind::ConnectionRefused);
    let config = RetryConfig::builder()
        .attempts(5)
        .exponential_backoff(Duration::from_millis(1), Duration::from_millis(4), None)
        .conditional_retry(io_transient)
        .build();

    let result = retry(|| service.call(), &config);

    assert_eq!(result.unwrap(), "payload");
    assert_eq!(service.calls(), 4);
}

#[test]
fn test_permanent_failure_is_not_retried() {
    let service = FlakyService::new(10, io::ErrorKind::PermissionDenied);
    let config = RetryConfig::builder()
        .exponential_backoff(Duration::from_millis(1), Duration::from_millis(4), None)
        .conditional_retry(io_transient)
        .build();

    let failure = retry(|| service.call(), &config).unwrap_err();

    assert_eq!(service.calls(), 1);
    assert_eq!(
        failure.first().map(io::Error::kind),
        Some(io::ErrorKind::PermissionDenied)
    );
}

#[test]
fn test_exhaustion_keeps_attempt_order() {
    let service = FlakyService::new(u32::MAX, io::ErrorKind::ConnectionReset);
    let config = RetryConfig::builder()
        .attempts(3)
        .constant_backoff(Duration::from_millis(1))
        .build();

    let failure = retry(|| service.call(), &config).unwrap_err();

    assert_eq!(
        failure.to_string(),
        "call 1 failed; call 2 failed; call 3 failed"
    );
    let source = std::error::Error::source(&failure).expect("last failure as source");
    assert_eq!(source.to_string(), "call 3 failed");
}

#[test]
fn test_constant_delay_is_waited() {
    let config = RetryConfig::builder()
        .attempts(3)
        .constant_backoff(Duration::from_millis(20))
        .build();
    let start = Instant::now();

    let result = retry(|| Err::<(), _>("down"), &config);

    assert_eq!(result.unwrap_err().len(), 3);
    // two waits, none after the last attempt
    assert!(start.elapsed() >= Duration::from_millis(40));
}

#[test]
fn test_settings_drive_the_loop() {
    let settings: RetrySettings = toml::from_str(
        r#"
        attempts = 4
        constant = true
        initial_delay_ms = 1
        "#,
    )
    .expect("valid toml");
    let service = FlakyService::new(u32::MAX, io::ErrorKind::ConnectionReset);

    let failure = retry(|| service.call(), &settings.into_config()).unwrap_err();

    assert_eq!(failure.len(), 4);
    assert_eq!(service.calls(), 4);
}

#[test]
fn test_independent_invocations_across_threads() {
    let config = RetryConfig::builder()
        .attempts(4)
        .constant_backoff(Duration::from_millis(1))
        .conditional_retry(io_transient)
        .build();

    let handles: Vec<_> = (0..4u32)
        .map(|failures| {
            let config = config.clone();
            thread::spawn(move || {
                let service = FlakyService::new(failures, io::ErrorKind::ConnectionReset);
                let result = config.run(|| service.call());
                (result.is_ok(), service.calls())
            })
        })
        .collect();

    for (failures, handle) in handles.into_iter().enumerate() {
        let (ok, calls) = handle.join().expect("worker panicked");
        assert!(ok, "worker with {} failures should recover", failures);
        assert_eq!(calls, failures as u32 + 1);
    }
}

#[tokio::test]
async fn test_async_transient_failures_recover() {
    let service = Arc::new(FlakyService::new(2, io::ErrorKind::BrokenPipe));
    let config = RetryConfig::builder()
        .constant_backoff(Duration::from_millis(1))
        .conditional_retry(io_transient)
        .build();

    let result = retry_async(
        || {
            let service = Arc::clone(&service);
            async move { service.call_async().await }
        },
        &config,
    )
    .await;

    assert_eq!(result.unwrap(), "payload");
    assert_eq!(service.calls(), 3);
}

#[tokio::test]
async fn test_async_invocations_run_concurrently() {
    let config = RetryConfig::builder()
        .attempts(3)
        .constant_backoff(Duration::from_millis(1))
        .build();

    let tasks: Vec<_> = (0..3u32)
        .map(|failures| {
            let config = config.clone();
            tokio::spawn(async move {
                let service = FlakyService::new(failures, io::ErrorKind::ConnectionReset);
                let result = config.run_async(|| service.call_async()).await;
                (result.is_ok(), service.calls())
            })
        })
        .collect();

    for (failures, task) in tasks.into_iter().enumerate() {
        let (ok, calls) = task.await.expect("task panicked");
        assert!(ok);
        assert_eq!(calls, failures as u32 + 1);
    }
}
