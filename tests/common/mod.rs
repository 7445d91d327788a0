//! Shared test utilities.
//!
//! `init_tracing` installs a subscriber once per process so tests run
//! with `--features tracing` stream build instrumentation to stderr,
//! filtered through `RUST_LOG`. Without the feature it still installs
//! cleanly and simply sees nothing.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the test subscriber. Safe to call from every test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Largest index with `keys[i] <= query`, or -1. Reference oracle.
pub fn oracle_predecessor(keys: &[i32], query: i32) -> i64 {
    keys.partition_point(|&k| k <= query) as i64 - 1
}

/// Smallest index with `keys[i] >= query`, or `keys.len()`. Reference
/// oracle.
pub fn oracle_lower_bound(keys: &[i32], query: i32) -> i64 {
    keys.partition_point(|&k| k < query) as i64
}

/// `n` evenly spaced keys starting at 0 with the given stride.
pub fn strided_keys(n: usize, stride: i32) -> Vec<i32> {
    (0..n).map(|i| i as i32 * stride).collect()
}
