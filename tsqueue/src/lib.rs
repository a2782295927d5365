#![warn(missing_debug_implementations, rust_2018_idioms)]

//! A thread-safe, unbounded, blocking FIFO queue.
//!
//! `tsqueue` provides [`SyncQueue`], a building block for producer/consumer
//! coordination between threads: producers [`push`](SyncQueue::push), and
//! consumers either poll with [`try_pop`](SyncQueue::try_pop) or park with
//! [`wait_and_pop`](SyncQueue::wait_and_pop) until an element arrives.
//!
//! The queue is generic over its element type and over the single-threaded
//! container that holds the elements (see [`store`]). Ownership moves in on
//! push and out on pop; the queue never inspects the elements.

pub mod error;
pub mod store;
pub mod sync_queue;
pub mod telemetry;

pub use error::QueueError;
pub use store::{ChunkedStore, ElementStore};
pub use sync_queue::SyncQueue;

// Helper function to check if a type is Send + Sync.
// Useful for static assertions in generic code.
#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}
