//! Storage acquisition errors.

use std::alloc::{self, Layout};

use thiserror::Error;

/// Errors surfaced while acquiring raw storage.
///
/// Element failures are not represented here: a panicking `Default`, `Clone`
/// or constructor closure unwinds through the collection instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StorageError {
  /// The requested number of slots does not fit in `isize::MAX` bytes.
  #[error("capacity overflow: {requested} slots requested")]
  CapacityOverflow {
    /// Number of slots requested.
    requested: usize,
  },
  /// The allocator could not satisfy the request.
  #[error("allocation of {} bytes (align {}) failed", .layout.size(), .layout.align())]
  AllocFailed {
    /// Layout that was requested.
    layout: Layout,
  },
}

impl StorageError {
  /// Diverges the way the non-`try` operations report a storage failure.
  pub(crate) fn raise(self) -> ! {
    match self {
      Self::CapacityOverflow { .. } => panic!("{self}"),
      Self::AllocFailed { layout } => alloc::handle_alloc_error(layout),
    }
  }
}
