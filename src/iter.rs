use std::{iter::FusedIterator, mem::ManuallyDrop, ptr, slice};

use crate::{array::DynamicArray, raw::RawStorage};

/// Owning iterator over the elements of a [`DynamicArray`].
///
/// Elements not yet yielded are dropped with the iterator, then the block is
/// freed.
pub struct IntoIter<T> {
  storage: RawStorage<T>,
  front: usize,
  back: usize,
}

impl<T> IntoIter<T> {
  /// The elements not yet yielded.
  pub fn as_slice(&self) -> &[T] {
    // SAFETY: `[front, back)` are live.
    unsafe { slice::from_raw_parts(self.storage.offset(self.front), self.back - self.front) }
  }
}

impl<T> IntoIterator for DynamicArray<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  fn into_iter(self) -> IntoIter<T> {
    // The elements now belong to the iterator.
    let mut array = ManuallyDrop::new(self);

    IntoIter {
      storage: array.storage.take(),
      front: 0,
      back: array.len,
    }
  }
}

impl<T> Iterator for IntoIter<T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    if self.front == self.back {
      return None;
    }

    // SAFETY: `front` is live and leaves the live range.
    let value = unsafe { self.storage.offset(self.front).read() };
    self.front += 1;
    Some(value)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.back - self.front;
    (remaining, Some(remaining))
  }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
  fn next_back(&mut self) -> Option<T> {
    if self.front == self.back {
      return None;
    }

    self.back -= 1;
    // SAFETY: the old `back - 1` is live and leaves the live range.
    Some(unsafe { self.storage.offset(self.back).read() })
  }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
  fn drop(&mut self) {
    // SAFETY: `[front, back)` are the only live slots left.
    unsafe {
      ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
        self.storage.offset(self.front),
        self.back - self.front,
      ))
    }
  }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
  type Item = &'a mut T;
  type IntoIter = slice::IterMut<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter_mut()
  }
}
