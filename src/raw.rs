use std::{
  alloc::Layout,
  fmt,
  marker::PhantomData,
  mem::{self, MaybeUninit},
  ptr::{self, NonNull},
};

use libc::c_void;

use crate::error::StorageError;

/// Largest alignment `malloc` guarantees on the current target.
#[cfg(target_pointer_width = "64")]
const MIN_ALIGN: usize = 16;
#[cfg(not(target_pointer_width = "64"))]
const MIN_ALIGN: usize = 8;

/// Requests `layout.size()` bytes from the C allocator.
///
/// # Safety
///
/// `layout.size()` must be non-zero.
unsafe fn allocate(layout: Layout) -> Result<NonNull<u8>, StorageError> {
  let address = unsafe {
    if layout.align() <= MIN_ALIGN {
      libc::malloc(layout.size())
    } else {
      // Any alignment above MIN_ALIGN is a power of two and a multiple of the
      // word size, as posix_memalign requires.
      let mut out: *mut c_void = ptr::null_mut();

      if libc::posix_memalign(&mut out, layout.align(), layout.size()) != 0 {
        ptr::null_mut()
      } else {
        out
      }
    }
  };

  NonNull::new(address as *mut u8).ok_or(StorageError::AllocFailed { layout })
}

/// An owned block of uninitialized slots for up to `capacity` values of `T`.
///
/// The storage never reads, writes or drops a `T`. Which slots hold live
/// values is the owner's business; dropping a `RawStorage` only returns the
/// block to the allocator.
///
/// ```text
///   block ──▶ ┌──────┬──────┬──────┬──────┬──────┐
///             │  ?   │  ?   │  ?   │  ?   │  ?   │   capacity = 5
///             └──────┴──────┴──────┴──────┴──────┘
///             offset(0)                      offset(5) (one past the end)
/// ```
pub struct RawStorage<T> {
  block: Option<NonNull<T>>,
  capacity: usize,
  _slots: PhantomData<T>,
}

// SAFETY: the storage exclusively owns its block; moving it to another thread
// moves the (uninitialized) slots with it.
unsafe impl<T: Send> Send for RawStorage<T> {}
// SAFETY: `&RawStorage` only hands out raw pointers; any access through them
// is the owner's responsibility.
unsafe impl<T: Sync> Sync for RawStorage<T> {}

impl<T> RawStorage<T> {
  /// Creates storage that owns no block.
  pub const fn new() -> Self {
    Self {
      block: None,
      capacity: 0,
      _slots: PhantomData,
    }
  }

  /// Allocates a block for `capacity` slots.
  ///
  /// A capacity of zero allocates nothing. Zero-sized `T` never reaches the
  /// allocator.
  pub fn with_capacity(capacity: usize) -> Result<Self, StorageError> {
    if capacity == 0 {
      return Ok(Self::new());
    }

    let layout = Layout::array::<T>(capacity)
      .map_err(|_| StorageError::CapacityOverflow { requested: capacity })?;

    let block = if layout.size() == 0 {
      NonNull::dangling()
    } else {
      // SAFETY: the layout size is non-zero.
      let address = unsafe { allocate(layout)? };
      log::trace!(
        "allocated {} bytes for {} slots at {:p}",
        layout.size(),
        capacity,
        address
      );
      address.cast()
    };

    Ok(Self {
      block: Some(block),
      capacity,
      _slots: PhantomData,
    })
  }

  /// Number of slots in the block.
  pub const fn capacity(&self) -> usize {
    self.capacity
  }

  /// Whether a block is currently owned.
  pub const fn is_allocated(&self) -> bool {
    self.block.is_some()
  }

  /// Pointer to the first slot. Dangling but well aligned when nothing is
  /// allocated, so it is always valid for zero-length accesses.
  pub fn as_ptr(&self) -> *mut T {
    self.block.unwrap_or(NonNull::dangling()).as_ptr()
  }

  /// Pointer to slot `offset`.
  ///
  /// # Safety
  ///
  /// `offset <= capacity`. One past the last slot is allowed but must not be
  /// dereferenced.
  pub unsafe fn offset(
    &self,
    offset: usize,
  ) -> *mut T {
    debug_assert!(
      offset <= self.capacity,
      "slot offset {offset} past capacity {}",
      self.capacity
    );
    unsafe { self.as_ptr().add(offset) }
  }

  /// The slot at `index`, viewed as uninitialized memory.
  ///
  /// # Safety
  ///
  /// `index < capacity`. Writing into a slot that already holds a live value
  /// leaks that value.
  pub unsafe fn slot_mut(
    &mut self,
    index: usize,
  ) -> &mut MaybeUninit<T> {
    debug_assert!(
      index < self.capacity,
      "slot index {index} out of capacity {}",
      self.capacity
    );
    unsafe { &mut *self.as_ptr().add(index).cast::<MaybeUninit<T>>() }
  }

  /// Exchanges blocks with `other`.
  pub fn swap(
    &mut self,
    other: &mut Self,
  ) {
    mem::swap(&mut self.block, &mut other.block);
    mem::swap(&mut self.capacity, &mut other.capacity);
  }

  /// Moves the block out, leaving `self` empty.
  pub fn take(&mut self) -> Self {
    mem::replace(self, Self::new())
  }

  /// Returns the block to the allocator. Does nothing on empty storage.
  pub fn release(&mut self) {
    if let Some(block) = self.block.take() {
      if mem::size_of::<T>() != 0 {
        // SAFETY: a non-dangling block came from `allocate`, and `free`
        // accepts memory from both `malloc` and `posix_memalign`.
        unsafe { libc::free(block.as_ptr().cast()) };
        log::trace!("released {} slots at {:p}", self.capacity, block);
      }
    }
    self.capacity = 0;
  }
}

impl<T> Default for RawStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Drop for RawStorage<T> {
  fn drop(&mut self) {
    self.release();
  }
}

impl<T> fmt::Debug for RawStorage<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("RawStorage")
      .field("block", &self.block)
      .field("capacity", &self.capacity)
      .finish()
  }
}

/// Moves `count` live values from `src` into the uninitialized slots at `dst`.
///
/// Moves are bitwise and cannot fail, so there is never a copy fallback.
/// Afterwards the source slots are logically uninitialized and must not be
/// dropped.
///
/// # Safety
///
/// `src` must hold `count` live values, `dst` must have room for `count`
/// values, and the two ranges must not overlap.
pub unsafe fn relocate<T>(
  src: *const T,
  dst: *mut T,
  count: usize,
) {
  unsafe { ptr::copy_nonoverlapping(src, dst, count) };
}
