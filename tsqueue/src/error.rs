// src/error.rs

use core::fmt;

/// Error returned when a queue cannot be constructed.
///
/// An empty `try_pop` is not an error and is reported as `None`; this type
/// only covers failures that would otherwise leave an unusable instance.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QueueError {
  /// The element store could not allocate room for the requested number of
  /// elements.
  ResourceExhausted {
    /// The capacity that was asked for.
    requested: usize,
  },
}

impl std::error::Error for QueueError {}
impl fmt::Display for QueueError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueueError::ResourceExhausted { requested } => {
        write!(f, "queue store allocation failed (requested capacity {})", requested)
      }
    }
  }
}
