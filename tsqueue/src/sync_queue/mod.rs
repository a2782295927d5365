// src/sync_queue/mod.rs

//! A lock-based, unbounded, blocking MPMC FIFO queue.
//!
//! [`SyncQueue`] wraps a single-threaded [`ElementStore`] in a
//! `parking_lot::Mutex` and pairs it with a `parking_lot::Condvar` that
//! consumers park on while the store is empty. Any number of threads may push
//! and pop concurrently through a shared reference (typically an `Arc`).
//!
//! ### Popping
//!
//! - [`SyncQueue::try_pop`] never blocks. An empty queue is reported as `None`.
//! - [`SyncQueue::wait_and_pop`] parks the calling thread until an element is
//!   available and removes it on the caller's behalf.
//!
//! Both decide on emptiness only after the lock is acquired, and the blocking
//! variant re-checks after every wakeup, so spurious wakeups and several
//! consumers racing for one element are harmless.
//!
//! ### Teardown
//!
//! Dropping the queue drops any elements still stored. Use
//! [`SyncQueue::into_inner`] to take them back instead. A queue that is shared
//! between threads cannot be dropped while one of them is still inside an
//! operation, so there is no "destroyed while in use" state to guard against.


use crate::error::QueueError;
use crate::store::ElementStore;
use crate::telemetry;

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

const LOC_PUSH: &str = "SyncQueue::push";
const LOC_PUSH_ALL: &str = "SyncQueue::push_all";
const LOC_TRY_POP: &str = "SyncQueue::try_pop";
const LOC_WAIT_AND_POP: &str = "SyncQueue::wait_and_pop";

/// State guarded by the queue's mutex.
struct Inner<S> {
  store: S,
  /// Threads currently parked in `wait_and_pop`.
  waiters: usize,
}

/// A thread-safe, unbounded FIFO queue with blocking and non-blocking pops.
///
/// `S` is the underlying single-threaded container. It defaults to
/// `VecDeque<T>`; [`ChunkedStore`](crate::ChunkedStore) is the alternative for
/// queues that grow and drain in large bursts.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use tsqueue::SyncQueue;
///
/// let queue = Arc::new(SyncQueue::<&str>::new());
/// let consumer = {
///   let queue = Arc::clone(&queue);
///   thread::spawn(move || queue.wait_and_pop())
/// };
///
/// queue.push("job");
/// assert_eq!(consumer.join().unwrap(), "job");
/// assert_eq!(queue.try_pop(), None);
/// ```
pub struct SyncQueue<T, S = VecDeque<T>> {
  inner: Mutex<Inner<S>>,
  not_empty: Condvar,
  // Elements only live inside `S`; this ties `T` to the type without
  // affecting auto traits.
  _marker: PhantomData<fn(T) -> T>,
}

impl<T> SyncQueue<T> {
  /// Creates an empty queue backed by a `VecDeque`.
  pub fn new() -> Self {
    Self::with_store(VecDeque::new())
  }

  /// Creates an empty queue with room for at least `capacity` elements.
  ///
  /// Returns [`QueueError::ResourceExhausted`] if the allocation fails.
  pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
    Self::try_with_store_capacity(capacity)
  }
}

impl<T> Default for SyncQueue<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> FromIterator<T> for SyncQueue<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    Self::with_store(iter.into_iter().collect())
  }
}

impl<T, S: ElementStore<T>> SyncQueue<T, S> {
  /// Wraps an existing store. Elements already in it are popped first.
  pub fn with_store(store: S) -> Self {
    SyncQueue {
      inner: Mutex::new(Inner { store, waiters: 0 }),
      not_empty: Condvar::new(),
      _marker: PhantomData,
    }
  }

  /// Creates an empty queue whose store has room for at least `capacity`
  /// elements.
  pub fn try_with_store_capacity(capacity: usize) -> Result<Self, QueueError> {
    let store = S::try_with_capacity(capacity).map_err(|_| QueueError::ResourceExhausted { requested: capacity })?;
    Ok(Self::with_store(store))
  }

  /// Appends `item` at the tail and wakes one parked consumer, if any.
  ///
  /// Only blocks for as long as another thread holds the lock.
  pub fn push(&self, item: T) {
    let (len, woke_waiter) = {
      let mut inner = self.inner.lock();
      inner.store.push(item);
      (inner.store.len(), self.not_empty.notify_one())
    };

    telemetry::log_event(Some(len), LOC_PUSH, "Push", None);
    if woke_waiter {
      telemetry::increment_counter(LOC_PUSH, "WokeWaiter");
    }
  }

  /// Appends every item from `items`, in order, under a single lock
  /// acquisition. Returns how many were pushed.
  ///
  /// Wakes one parked consumer per pushed item, stopping early once no
  /// consumer is left parked.
  pub fn push_all<I: IntoIterator<Item = T>>(&self, items: I) -> usize {
    // Collected up front so that no caller code runs while the lock is held.
    let items: Vec<T> = items.into_iter().collect();
    let pushed = items.len();
    if pushed == 0 {
      return 0;
    }

    let woken = {
      let mut inner = self.inner.lock();
      for item in items {
        inner.store.push(item);
      }
      let mut woken = 0;
      while woken < pushed && self.not_empty.notify_one() {
        woken += 1;
      }
      woken
    };

    telemetry::log_event(Some(pushed), LOC_PUSH_ALL, "PushAll", None);
    if woken > 0 {
      telemetry::increment_counter(LOC_PUSH_ALL, "WokeWaiter");
    }
    pushed
  }

  /// Removes and returns the head element, or `None` if the queue is empty.
  ///
  /// Never blocks beyond acquiring the lock.
  pub fn try_pop(&self) -> Option<T> {
    let popped = self.inner.lock().store.pop();

    match popped {
      Some(_) => telemetry::increment_counter(LOC_TRY_POP, "Hit"),
      None => telemetry::increment_counter(LOC_TRY_POP, "Empty"),
    }
    popped
  }

  /// Removes and returns the head element, parking the calling thread until
  /// one is available.
  ///
  /// There is no timeout: if nothing is ever pushed, this never returns.
  pub fn wait_and_pop(&self) -> T {
    let mut parks = 0usize;
    let item = {
      let mut inner = self.inner.lock();
      loop {
        if let Some(item) = inner.store.pop() {
          break item;
        }
        inner.waiters += 1;
        self.not_empty.wait(&mut inner);
        inner.waiters -= 1;
        parks += 1;
      }
    };

    if parks > 0 {
      telemetry::log_event(Some(parks), LOC_WAIT_AND_POP, "PoppedAfterPark", None);
      telemetry::increment_counter(LOC_WAIT_AND_POP, "Parked");
    } else {
      telemetry::increment_counter(LOC_WAIT_AND_POP, "Immediate");
    }
    item
  }

  /// Number of stored elements. Stale as soon as it returns.
  pub fn len(&self) -> usize {
    self.inner.lock().store.len()
  }

  /// Whether the queue is empty. Stale as soon as it returns.
  pub fn is_empty(&self) -> bool {
    self.inner.lock().store.is_empty()
  }

  /// Number of threads currently parked in [`wait_and_pop`](Self::wait_and_pop).
  pub fn waiters(&self) -> usize {
    self.inner.lock().waiters
  }

  /// Consumes the queue, returning the store with any elements not yet popped.
  pub fn into_inner(self) -> S {
    self.inner.into_inner().store
  }
}

impl<T, S: ElementStore<T>> fmt::Debug for SyncQueue<T, S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.inner.try_lock() {
      Some(inner) => f
        .debug_struct("SyncQueue")
        .field("len", &inner.store.len())
        .field("waiters", &inner.waiters)
        .finish(),
      None => f.debug_struct("SyncQueue").field("inner", &"<locked>").finish(),
    }
  }
}
