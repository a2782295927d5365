//! Two threads bounce a counter back and forth through a pair of queues.
//!
//! Run with `cargo run --example ping_pong --features tsqueue_telemetry` to
//! see the recorded queue events afterwards.

use std::sync::Arc;
use std::thread;
use tsqueue::{telemetry, SyncQueue};

const ROUND_TRIPS: usize = 100;

fn main() {
  let pings = Arc::new(SyncQueue::<usize>::new());
  let pongs = Arc::new(SyncQueue::<usize>::new());

  let ponger = {
    let (pings, pongs) = (Arc::clone(&pings), Arc::clone(&pongs));
    thread::spawn(move || {
      for _ in 0..ROUND_TRIPS {
        let counter = pings.wait_and_pop();
        pongs.push(counter + 1);
      }
    })
  };

  let mut counter = 0;
  for _ in 0..ROUND_TRIPS {
    pings.push(counter);
    counter = pongs.wait_and_pop();
  }
  ponger.join().expect("ponger thread panicked");

  println!("counter after {} round trips: {}", ROUND_TRIPS, counter);
  telemetry::print_telemetry_report();
}
