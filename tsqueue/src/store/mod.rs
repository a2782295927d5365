//! Unsynchronized FIFO containers that a [`SyncQueue`](crate::SyncQueue) wraps.
//!
//! An [`ElementStore`] is plain single-threaded storage. It never sees
//! concurrent access: the queue keeps it inside its mutex, so every call here
//! happens with the lock held.

mod chunked;

pub use chunked::{ChunkedStore, Iter};

use std::collections::{TryReserveError, VecDeque};

/// A single-threaded FIFO container.
///
/// Elements come out of [`pop`](ElementStore::pop) in the order they went
/// into [`push`](ElementStore::push). Releasing the container's resources is
/// the implementor's `Drop`.
pub trait ElementStore<T> {
  /// Creates an empty store with room for at least `capacity` elements.
  fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError>
  where
    Self: Sized;

  /// Appends `item` at the tail. Amortized O(1), never fails.
  fn push(&mut self, item: T);

  /// Removes and returns the head element, or `None` if the store is empty.
  fn pop(&mut self) -> Option<T>;

  /// Number of stored elements.
  fn len(&self) -> usize;

  #[inline]
  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<T> ElementStore<T> for VecDeque<T> {
  fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
    let mut store = VecDeque::new();
    store.try_reserve(capacity)?;
    Ok(store)
  }

  #[inline]
  fn push(&mut self, item: T) {
    self.push_back(item);
  }

  #[inline]
  fn pop(&mut self) -> Option<T> {
    self.pop_front()
  }

  #[inline]
  fn len(&self) -> usize {
    VecDeque::len(self)
  }

  #[inline]
  fn is_empty(&self) -> bool {
    VecDeque::is_empty(self)
  }
}

impl<T, const BLOCK_SIZE: usize> ElementStore<T> for ChunkedStore<T, BLOCK_SIZE> {
  fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
    ChunkedStore::try_with_capacity(capacity)
  }

  #[inline]
  fn push(&mut self, item: T) {
    self.push_back(item);
  }

  #[inline]
  fn pop(&mut self) -> Option<T> {
    self.pop_front()
  }

  #[inline]
  fn len(&self) -> usize {
    ChunkedStore::len(self)
  }

  #[inline]
  fn is_empty(&self) -> bool {
    ChunkedStore::is_empty(self)
  }
}
