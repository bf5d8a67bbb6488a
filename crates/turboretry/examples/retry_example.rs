//! Example: retrying flaky operations with turboretry
//!
//! This example demonstrates:
//! 1. Basic retry with the default policy
//! 2. Constant backoff
//! 3. Exponential backoff with jitter
//! 4. Conditional retry (only transient I/O errors)
//!
//! Run with:
//! ```bash
//! RUST_LOG=turboretry=debug cargo run -p turboretry --example retry_example --features tracing
//! ```

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use turboretry::prelude::*;

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: AtomicU32,
    fail_count: u32,
    kind: io::ErrorKind,
}

impl UnreliableApi {
    fn new(fail_count: u32, kind: io::ErrorKind) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
            kind,
        }
    }

    fn call(&self) -> Result<String, io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED ({:?})", attempt + 1, self.kind);
            Err(io::Error::new(
                self.kind,
                format!("error on attempt {}", attempt + 1),
            ))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: default policy (5 attempts, 1s..10s exponential)
fn example_basic() {
    println!("\n=== Example 1: Basic Retry ===\n");

    let api = UnreliableApi::new(1, io::ErrorKind::ConnectionReset);
    let start = Instant::now();

    match retry(|| api.call(), &RetryConfig::default()) {
        Ok(data) => println!("\n✓ Success: {}", data),
        Err(failure) => println!("\n✗ Failed: {}", failure),
    }
    println!(
        "  Total attempts: {}, elapsed {:?}",
        api.total_attempts(),
        start.elapsed()
    );
}

/// Example 2: constant backoff until attempts run out
fn example_constant_backoff() {
    println!("\n=== Example 2: Constant Backoff ===\n");

    let api = UnreliableApi::new(u32::MAX, io::ErrorKind::ConnectionRefused);
    let config = RetryConfig::builder()
        .attempts(3)
        .constant_backoff(Duration::from_millis(200))
        .build();

    match config.run(|| api.call()) {
        Ok(data) => println!("\n✓ Success: {}", data),
        Err(failure) => {
            println!("\n✗ All {} attempts failed: {}", failure.len(), failure);
        }
    }
}

/// Example 3: exponential backoff with jitter
async fn example_exponential_backoff() {
    println!("\n=== Example 3: Exponential Backoff ===\n");

    let api = UnreliableApi::new(3, io::ErrorKind::BrokenPipe);
    let config = RetryConfig::builder()
        .attempts(5)
        .exponential_backoff(Duration::from_millis(50), Duration::from_secs(1), Some(3.0))
        .build();

    println!("Sampled delays per retry:");
    for attempt in 0..4 {
        println!(
            "  retry {}: sampled {:?}",
            attempt + 1,
            config.backoff().compute_delay(attempt)
        );
    }
    println!();

    let start = Instant::now();
    let result = config.run_async(|| async { api.call() }).await;

    match result {
        Ok(data) => println!("\n✓ Success after {:?}: {}", start.elapsed(), data),
        Err(failure) => println!("\n✗ Failed: {}", failure),
    }
}

/// Example 4: only retry transient I/O failures
fn example_conditional_retry() {
    println!("\n=== Example 4: Conditional Retry ===\n");

    let config = RetryConfig::builder()
        .attempts(5)
        .constant_backoff(Duration::from_millis(50))
        .conditional_retry(io_transient)
        .build();

    println!("Testing with TimedOut error (should NOT retry):");
    let api = UnreliableApi::new(u32::MAX, io::ErrorKind::TimedOut);
    if let Err(failure) = retry(|| api.call(), &config) {
        println!("  Gave up after {} attempt(s): {}", failure.len(), failure);
    }

    println!("\nTesting with ConnectionReset error (should retry):");
    let api = UnreliableApi::new(2, io::ErrorKind::ConnectionReset);
    if let Ok(data) = retry(|| api.call(), &config) {
        println!("  Recovered after {} attempts: {}", api.total_attempts(), data);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║       turboretry - Retry Strategy Examples           ║");
    println!("╚══════════════════════════════════════════════════════╝");

    example_basic();
    example_constant_backoff();
    example_exponential_backoff().await;
    example_conditional_retry();

    println!("\n✓ All examples completed!");
}
