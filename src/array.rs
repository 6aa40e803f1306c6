use std::{
  fmt,
  mem,
  ops::{Deref, DerefMut},
  ptr, slice,
};

use crate::{
  edit,
  error::StorageError,
  guard::InitGuard,
  raw::{self, RawStorage},
};

/// A contiguous growable array built on [`RawStorage`].
///
/// ```text
///   storage ──▶ ┌──────┬──────┬──────┬──────┬──────┬──────┐
///               │  T   │  T   │  T   │  ?   │  ?   │  ?   │
///               └──────┴──────┴──────┴──────┴──────┴──────┘
///               ◀──── live (len) ────▶◀─── uninitialized ──▶
///               ◀─────────────── capacity ─────────────────▶
/// ```
///
/// Slots `[0, len)` hold live values owned by the array, slots
/// `[len, capacity)` are uninitialized. Every operation that can fail either
/// commits completely or leaves `len` and the existing values as they were.
pub struct DynamicArray<T> {
  pub(crate) storage: RawStorage<T>,
  pub(crate) len: usize,
}

impl<T> DynamicArray<T> {
  /// Creates an empty array. Nothing is allocated.
  pub const fn new() -> Self {
    Self {
      storage: RawStorage::new(),
      len: 0,
    }
  }

  /// Creates an empty array with room for `capacity` elements.
  pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
    Ok(Self {
      storage: RawStorage::with_capacity(capacity)?,
      len: 0,
    })
  }

  /// Creates an empty array with room for `capacity` elements.
  pub fn with_capacity(capacity: usize) -> Self {
    Self::try_with_capacity(capacity).unwrap_or_else(|e| e.raise())
  }

  /// Creates an array of `size` elements, the `i`-th built by `make(i)`.
  ///
  /// The capacity is exactly `size`. If `make` panics, the elements built so
  /// far are dropped and the storage is freed before the panic continues.
  pub fn try_from_fn<F>(
    size: usize,
    mut make: F,
  ) -> Result<Self, StorageError>
  where
    F: FnMut(usize) -> T,
  {
    let storage = RawStorage::with_capacity(size)?;

    // SAFETY: the storage has `size` free slots and outlives the guard.
    let mut guard = unsafe { InitGuard::new(storage.as_ptr()) };
    for index in 0..size {
      unsafe { guard.write(make(index)) };
    }
    let len = guard.commit();

    Ok(Self {
      storage,
      len,
    })
  }

  /// See [`try_from_fn`](DynamicArray::try_from_fn).
  pub fn from_fn<F>(
    size: usize,
    make: F,
  ) -> Self
  where
    F: FnMut(usize) -> T,
  {
    Self::try_from_fn(size, make).unwrap_or_else(|e| e.raise())
  }

  /// Creates an array of `size` default values.
  pub fn try_with_size(size: usize) -> Result<Self, StorageError>
  where
    T: Default,
  {
    Self::try_from_fn(size, |_| T::default())
  }

  /// Creates an array of `size` default values.
  pub fn with_size(size: usize) -> Self
  where
    T: Default,
  {
    Self::try_with_size(size).unwrap_or_else(|e| e.raise())
  }

  pub const fn len(&self) -> usize {
    self.len
  }

  pub const fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub const fn capacity(&self) -> usize {
    self.storage.capacity()
  }

  pub fn as_ptr(&self) -> *const T {
    self.storage.as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.storage.as_ptr()
  }

  pub fn as_slice(&self) -> &[T] {
    // SAFETY: `[0, len)` are live and the pointer is aligned and non-null.
    unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    // SAFETY: as above, and `&mut self` makes the borrow unique.
    unsafe { slice::from_raw_parts_mut(self.storage.as_ptr(), self.len) }
  }

  /// Grows the capacity to at least `new_capacity` elements.
  ///
  /// `new_capacity` is a total, not an increment. When it does not exceed the
  /// current capacity nothing happens. Otherwise the live elements are moved
  /// into a fresh block which then replaces the old one. On error the array is
  /// untouched.
  pub fn try_reserve(
    &mut self,
    new_capacity: usize,
  ) -> Result<(), StorageError> {
    if new_capacity <= self.capacity() {
      return Ok(());
    }

    let mut fresh = RawStorage::with_capacity(new_capacity)?;
    // SAFETY: `[0, len)` are live, `fresh` has room for them, and distinct
    // blocks never overlap.
    unsafe { raw::relocate(self.storage.as_ptr(), fresh.as_ptr(), self.len) };
    self.storage.swap(&mut fresh);

    log::debug!(
      "reserve: moved {} elements from {} to {} slots",
      self.len,
      fresh.capacity(),
      new_capacity
    );
    Ok(())
  }

  /// See [`try_reserve`](DynamicArray::try_reserve).
  pub fn reserve(
    &mut self,
    new_capacity: usize,
  ) {
    self.try_reserve(new_capacity).unwrap_or_else(|e| e.raise())
  }

  /// Resizes to `new_len`, building new elements with `make`.
  ///
  /// Shrinking drops the tail and keeps the capacity. Growing reserves
  /// `new_len` first; if `make` panics part way, the new elements are dropped
  /// and the length stays as it was (the reservation is kept).
  pub fn try_resize_with<F>(
    &mut self,
    new_len: usize,
    mut make: F,
  ) -> Result<(), StorageError>
  where
    F: FnMut() -> T,
  {
    if new_len <= self.len {
      self.truncate(new_len);
      return Ok(());
    }

    self.try_reserve(new_len)?;

    // SAFETY: slots `[len, new_len)` exist after the reservation and are free.
    let mut guard = unsafe { InitGuard::new(self.storage.offset(self.len)) };
    for _ in self.len..new_len {
      unsafe { guard.write(make()) };
    }
    self.len += guard.commit();
    Ok(())
  }

  /// See [`try_resize_with`](DynamicArray::try_resize_with).
  pub fn resize_with<F>(
    &mut self,
    new_len: usize,
    make: F,
  ) where
    F: FnMut() -> T,
  {
    self.try_resize_with(new_len, make).unwrap_or_else(|e| e.raise())
  }

  /// Resizes to `new_len`, filling new slots with `T::default()`.
  pub fn resize(
    &mut self,
    new_len: usize,
  ) where
    T: Default,
  {
    self.resize_with(new_len, T::default)
  }

  /// Drops every element from `new_len` on. The capacity is unchanged.
  pub fn truncate(
    &mut self,
    new_len: usize,
  ) {
    if new_len >= self.len {
      return;
    }

    // SAFETY: `new_len < len <= capacity`.
    let tail =
      ptr::slice_from_raw_parts_mut(unsafe { self.storage.offset(new_len) }, self.len - new_len);
    self.len = new_len;
    unsafe { ptr::drop_in_place(tail) };
  }

  pub fn clear(&mut self) {
    self.truncate(0);
  }

  /// Exchanges contents with `other` without touching any element.
  pub fn swap_with(
    &mut self,
    other: &mut Self,
  ) {
    self.storage.swap(&mut other.storage);
    mem::swap(&mut self.len, &mut other.len);
  }

  /// Moves the contents out into a new array, leaving `self` empty with no
  /// capacity.
  pub fn take(&mut self) -> Self {
    mem::take(self)
  }
}

impl<T> Drop for DynamicArray<T> {
  fn drop(&mut self) {
    // SAFETY: `[0, len)` are live; the storage frees the block afterwards.
    unsafe {
      ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
        self.storage.as_ptr(),
        self.len,
      ))
    }
  }
}

impl<T> Default for DynamicArray<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Deref for DynamicArray<T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T> DerefMut for DynamicArray<T> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
  fn as_ref(&self) -> &[T] {
    self
  }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
  fn as_mut(&mut self) -> &mut [T] {
    self
  }
}

impl<T: Clone> Clone for DynamicArray<T> {
  /// Clones every element into a block sized exactly to `self.len()`.
  fn clone(&self) -> Self {
    Self::from_fn(self.len, |index| self[index].clone())
  }

  /// Copy-assignment.
  ///
  /// If `source` does not fit in the current capacity, a full clone is built
  /// and swapped in, so a panicking `clone` leaves `self` untouched.
  /// Otherwise the shared prefix is assigned in place, then the extra tail is
  /// cloned into free slots or the surplus is dropped.
  fn clone_from(
    &mut self,
    source: &Self,
  ) {
    if source.len > self.capacity() {
      let mut fresh = source.clone();
      self.swap_with(&mut fresh);
      return;
    }

    let shared = self.len.min(source.len);
    self[..shared].clone_from_slice(&source[..shared]);

    if source.len > self.len {
      // SAFETY: `source.len <= capacity`, so the tail slots exist and are free.
      let mut guard = unsafe { InitGuard::new(self.storage.offset(self.len)) };
      for value in &source[self.len..] {
        unsafe { guard.write(value.clone()) };
      }
      self.len += guard.commit();
    } else {
      self.truncate(source.len);
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
  fn from(values: &[T]) -> Self {
    Self::from_fn(values.len(), |index| values[index].clone())
  }
}

impl<T> Extend<T> for DynamicArray<T> {
  fn extend<I: IntoIterator<Item = T>>(
    &mut self,
    iter: I,
  ) {
    let iter = iter.into_iter();
    let (lower, _) = iter.size_hint();
    let required = self.len.saturating_add(lower);

    if required > self.capacity() {
      let target =
        edit::grown_capacity(self.capacity()).map_or(required, |grown| grown.max(required));
      self.reserve(target);
    }

    for value in iter {
      self.push(value);
    }
  }
}

impl<T> FromIterator<T> for DynamicArray<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut array = Self::new();
    array.extend(iter);
    array
  }
}
