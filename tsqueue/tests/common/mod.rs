#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);
pub const STRESS_TIMEOUT: Duration = Duration::from_secs(15);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;

/// Per-thread element count for the drain tests.
pub const ELEMENTS_PER_THREAD: usize = 100 * 1000;
pub const REPEATS: usize = 3;

/// Polls `cond` until it holds, panicking after `timeout`.
pub fn wait_until<F: Fn() -> bool>(timeout: Duration, what: &str, cond: F) {
  let deadline = Instant::now() + timeout;
  while !cond() {
    assert!(Instant::now() < deadline, "timed out waiting for {}", what);
    thread::sleep(Duration::from_millis(1));
  }
}
