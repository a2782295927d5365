use std::collections::{TryReserveError, VecDeque};
use std::fmt;
use std::iter::FusedIterator;
use std::mem::MaybeUninit;

/// A block of slots for the ChunkedStore.
///
/// Aligned to 128 bytes to ensure cache-line alignment on most architectures (x86_64: 64, aarch64: up to 128).
#[repr(align(128))]
struct Block<T, const N: usize> {
  slots: [MaybeUninit<T>; N],
}

impl<T, const N: usize> Block<T, N> {
  fn new() -> Self {
    // Safety: An array of MaybeUninit is valid without initialization.
    let slots = unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() };
    Self { slots }
  }
}

/// A FIFO store built from fixed-size blocks.
///
/// Memory is allocated and released one block (`BLOCK_SIZE` elements) at a
/// time, which keeps allocator traffic low for queues that grow and drain in
/// streams. One drained block is kept around so that a queue oscillating
/// between empty and a handful of elements does not allocate at all.
///
/// Layout: live elements start at `head_offset` in the front block, every
/// block between front and back is full, and the back block is filled up to
/// `tail_offset`.
pub struct ChunkedStore<T, const BLOCK_SIZE: usize = 64> {
  blocks: VecDeque<Block<T, BLOCK_SIZE>>,

  // Position within the head block (blocks.front())
  head_offset: usize,
  // Position within the tail block (blocks.back())
  tail_offset: usize,

  len: usize,
}

impl<T, const BLOCK_SIZE: usize> fmt::Debug for ChunkedStore<T, BLOCK_SIZE> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChunkedStore")
      .field("len", &self.len)
      .field("head_offset", &self.head_offset)
      .field("tail_offset", &self.tail_offset)
      .field("block_count", &self.blocks.len())
      .finish()
  }
}

impl<T, const BLOCK_SIZE: usize> Default for ChunkedStore<T, BLOCK_SIZE> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, const BLOCK_SIZE: usize> ChunkedStore<T, BLOCK_SIZE> {
  const NON_ZERO_BLOCK: () = assert!(BLOCK_SIZE > 0, "ChunkedStore BLOCK_SIZE must be non-zero");

  /// Creates an empty store. No block is allocated until the first push.
  pub fn new() -> Self {
    #[allow(clippy::let_unit_value)]
    let () = Self::NON_ZERO_BLOCK;
    Self {
      blocks: VecDeque::new(),
      head_offset: 0,
      tail_offset: 0,
      len: 0,
    }
  }

  /// Creates an empty store with enough blocks reserved for `capacity` elements.
  pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
    let mut store = Self::new();
    store.blocks.try_reserve(capacity.div_ceil(BLOCK_SIZE))?;
    Ok(store)
  }

  /// Returns the number of elements in the store.
  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  /// Returns true if the store is empty.
  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Adds an element to the back of the store.
  pub fn push_back(&mut self, item: T) {
    // Fast path: room left in the tail block.
    if self.tail_offset < BLOCK_SIZE {
      if let Some(tail_block) = self.blocks.back_mut() {
        // Safety: tail_offset < BLOCK_SIZE and the slot is past the last live element.
        unsafe {
          tail_block
            .slots
            .get_unchecked_mut(self.tail_offset)
            .write(item);
        }
        self.tail_offset += 1;
        self.len += 1;
        return;
      }
    }

    // Slow path: no blocks yet, or the tail block is full.
    let mut new_block = Block::new();
    // Safety: BLOCK_SIZE > 0, so slot 0 exists.
    unsafe {
      new_block.slots.get_unchecked_mut(0).write(item);
    }
    self.blocks.push_back(new_block);

    if self.len == 0 {
      self.head_offset = 0;
    }
    self.tail_offset = 1;
    self.len += 1;
  }

  /// Removes the first element and returns it, or None if the store is empty.
  pub fn pop_front(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    let head_block = self.blocks.front_mut()?;
    // Safety: len > 0, so the slot at head_offset holds a live element. The
    // offset is advanced right after, so it is never read twice.
    let item = unsafe {
      head_block
        .slots
        .get_unchecked(self.head_offset)
        .assume_init_read()
    };
    self.head_offset += 1;
    self.len -= 1;

    if self.len == 0 {
      // Everything lived in a single block; keep it as the spare and rewind.
      self.head_offset = 0;
      self.tail_offset = 0;
    } else if self.head_offset == BLOCK_SIZE {
      // Head block exhausted and more elements follow in the next block.
      self.blocks.pop_front();
      self.head_offset = 0;
    }

    Some(item)
  }

  /// Drops every element and frees all blocks.
  pub fn clear(&mut self) {
    while self.pop_front().is_some() {}
    self.blocks.clear();
    self.head_offset = 0;
    self.tail_offset = 0;
  }

  /// Creates a front-to-back iterator over the elements.
  pub fn iter(&self) -> Iter<'_, T, BLOCK_SIZE> {
    Iter {
      store: self,
      block_idx: 0,
      offset: self.head_offset,
      remaining: self.len,
    }
  }
}

impl<T, const B: usize> Drop for ChunkedStore<T, B> {
  fn drop(&mut self) {
    self.clear();
  }
}

impl<T, const B: usize> Extend<T> for ChunkedStore<T, B> {
  fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
    for item in iter {
      self.push_back(item);
    }
  }
}

impl<T, const B: usize> FromIterator<T> for ChunkedStore<T, B> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut store = Self::new();
    store.extend(iter);
    store
  }
}

impl<'a, T, const B: usize> IntoIterator for &'a ChunkedStore<T, B> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T, B>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Borrowing iterator returned by [`ChunkedStore::iter`].
pub struct Iter<'a, T, const B: usize> {
  store: &'a ChunkedStore<T, B>,
  block_idx: usize,
  offset: usize,
  remaining: usize,
}

impl<'a, T, const B: usize> fmt::Debug for Iter<'a, T, B> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Iter").field("remaining", &self.remaining).finish()
  }
}

impl<'a, T, const B: usize> Iterator for Iter<'a, T, B> {
  type Item = &'a T;

  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining == 0 {
      return None;
    }

    let block = &self.store.blocks[self.block_idx];
    // Safety: `remaining` counts live slots from (block_idx, offset) onwards.
    let item = unsafe { block.slots.get_unchecked(self.offset).assume_init_ref() };

    self.offset += 1;
    if self.offset == B {
      self.offset = 0;
      self.block_idx += 1;
    }
    self.remaining -= 1;

    Some(item)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<'a, T, const B: usize> ExactSizeIterator for Iter<'a, T, B> {}
impl<'a, T, const B: usize> FusedIterator for Iter<'a, T, B> {}
