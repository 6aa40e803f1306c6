use std::{mem, ptr};

/// Counts values constructed into a run of uninitialized slots.
///
/// If the guard is dropped before [`commit`](InitGuard::commit), which is what
/// happens when a constructor panics, every value it wrote is destroyed again.
/// The slots themselves are left for their storage to free.
pub(crate) struct InitGuard<T> {
  base: *mut T,
  initialized: usize,
}

impl<T> InitGuard<T> {
  /// # Safety
  ///
  /// `base` must point at enough uninitialized slots for every value later
  /// passed to [`write`](InitGuard::write), and those slots must outlive the
  /// guard.
  pub(crate) unsafe fn new(base: *mut T) -> Self {
    Self {
      base,
      initialized: 0,
    }
  }

  /// Writes `value` into the next slot.
  ///
  /// # Safety
  ///
  /// The next slot must exist per the contract of [`new`](InitGuard::new).
  pub(crate) unsafe fn write(
    &mut self,
    value: T,
  ) {
    unsafe { self.base.add(self.initialized).write(value) };
    self.initialized += 1;
  }

  /// Hands ownership of the written values to the caller and returns how many
  /// there are.
  pub(crate) fn commit(self) -> usize {
    let initialized = self.initialized;
    mem::forget(self);
    initialized
  }
}

impl<T> Drop for InitGuard<T> {
  fn drop(&mut self) {
    // SAFETY: exactly `initialized` values were written starting at `base`.
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.initialized)) }
  }
}
