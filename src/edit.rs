//! Insertion and removal at arbitrary positions.
//!
//! Growth is build-then-swap: the new element and every relocated element land
//! in a fresh block, and only a completed block replaces the current one.
//!
//! ```text
//!   insert at 1, len == capacity == 3
//!
//!   old   ┌───┬───┬───┐
//!         │ a │ b │ c │
//!         └───┴───┴───┘
//!           │  ╲   ╲
//!   new   ┌───┬───┬───┬───┬───┬───┐
//!         │ a │ X │ b │ c │ ? │ ? │    X is built first, then a, then b c
//!         └───┴───┴───┴───┴───┴───┘
//! ```

use std::ptr;

use crate::{
  array::DynamicArray,
  error::StorageError,
  raw::{self, RawStorage},
};

/// Capacity after one growth step: doubling, starting from one slot.
pub(crate) fn grown_capacity(capacity: usize) -> Result<usize, StorageError> {
  capacity
    .checked_mul(2)
    .map(|doubled| doubled.max(1))
    .ok_or(StorageError::CapacityOverflow {
      requested: capacity.saturating_add(1),
    })
}

impl<T> DynamicArray<T> {
  /// Inserts the value built by `make` at `index`, shifting later elements
  /// right. Returns the new element.
  ///
  /// `make` runs before any element is moved, so if it panics the array is
  /// exactly as before. On a storage error the array is also unchanged.
  ///
  /// # Panics
  ///
  /// Panics if `index > len`.
  pub fn try_emplace<F>(
    &mut self,
    index: usize,
    make: F,
  ) -> Result<&mut T, StorageError>
  where
    F: FnOnce() -> T,
  {
    assert!(
      index <= self.len,
      "insertion index (is {index}) should be <= len (is {})",
      self.len
    );

    if self.len == self.capacity() {
      self.emplace_grow(index, make)?;
    } else {
      self.emplace_in_place(index, make);
    }
    self.len += 1;

    // SAFETY: `index` now holds the new live element.
    Ok(unsafe { &mut *self.storage.offset(index) })
  }

  /// Builds the new element in a block twice the size, then moves the prefix
  /// and suffix around it and swaps the block in.
  fn emplace_grow<F>(
    &mut self,
    offset: usize,
    make: F,
  ) -> Result<(), StorageError>
  where
    F: FnOnce() -> T,
  {
    let new_capacity = grown_capacity(self.capacity())?;
    let mut fresh = RawStorage::with_capacity(new_capacity)?;

    // A panic in `make` frees `fresh`, which holds nothing yet.
    // SAFETY: `offset <= len < new_capacity`.
    unsafe { fresh.slot_mut(offset).write(make()) };

    // SAFETY: the prefix `[0, offset)` and suffix `[offset, len)` are live in
    // the old block and land on free slots either side of the new element.
    unsafe {
      let old = self.storage.as_ptr();
      let new = fresh.as_ptr();
      raw::relocate(old, new, offset);
      raw::relocate(old.add(offset), new.add(offset + 1), self.len - offset);
    }
    self.storage.swap(&mut fresh);

    log::debug!(
      "grow: moved {} elements from {} to {} slots",
      self.len,
      fresh.capacity(),
      new_capacity
    );
    Ok(())
  }

  /// Builds the new element first, then opens a gap at `offset`.
  fn emplace_in_place<F>(
    &mut self,
    offset: usize,
    make: F,
  ) where
    F: FnOnce() -> T,
  {
    let value = make();

    // SAFETY: `len < capacity`, so shifting `[offset, len)` by one stays in
    // the block; the gap at `offset` is then filled.
    unsafe {
      let slot = self.storage.offset(offset);
      ptr::copy(slot, slot.add(1), self.len - offset);
      slot.write(value);
    }
  }

  /// See [`try_emplace`](DynamicArray::try_emplace).
  pub fn emplace<F>(
    &mut self,
    index: usize,
    make: F,
  ) -> &mut T
  where
    F: FnOnce() -> T,
  {
    self.try_emplace(index, make).unwrap_or_else(|e| e.raise())
  }

  /// Inserts `value` at `index`, shifting later elements right.
  ///
  /// # Panics
  ///
  /// Panics if `index > len`.
  pub fn insert(
    &mut self,
    index: usize,
    value: T,
  ) -> &mut T {
    self.emplace(index, || value)
  }

  pub fn try_push(
    &mut self,
    value: T,
  ) -> Result<&mut T, StorageError> {
    self.try_emplace(self.len, || value)
  }

  /// Appends `value` and returns it.
  pub fn push(
    &mut self,
    value: T,
  ) -> &mut T {
    self.emplace(self.len, || value)
  }

  /// Appends the value built by `make` and returns it.
  pub fn emplace_back<F>(
    &mut self,
    make: F,
  ) -> &mut T
  where
    F: FnOnce() -> T,
  {
    self.emplace(self.len, make)
  }

  /// Removes the last element and returns it, or `None` if empty.
  pub fn pop(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    self.len -= 1;
    // SAFETY: the slot at the old last index was live and is now outside len.
    Some(unsafe { self.storage.offset(self.len).read() })
  }

  /// Drops the last element.
  ///
  /// # Panics
  ///
  /// Panics if the array is empty.
  pub fn pop_back(&mut self) {
    assert!(self.len > 0, "pop_back on an empty array");
    self.truncate(self.len - 1);
  }

  /// Removes the element at `index`, shifting later elements left.
  ///
  /// # Panics
  ///
  /// Panics if `index >= len`.
  pub fn remove(
    &mut self,
    index: usize,
  ) -> T {
    assert!(
      index < self.len,
      "removal index (is {index}) should be < len (is {})",
      self.len
    );

    // SAFETY: `index` is live; the tail `(index, len)` moves down over it and
    // the last slot becomes uninitialized.
    unsafe {
      let slot = self.storage.offset(index);
      let value = slot.read();
      ptr::copy(slot.add(1), slot, self.len - index - 1);
      self.len -= 1;
      value
    }
  }

  /// Drops the element at `index` and returns the index of the element that
  /// followed it, which is `index` itself (equal to `len` if the last element
  /// was erased).
  ///
  /// # Panics
  ///
  /// Panics if `index >= len`.
  pub fn erase(
    &mut self,
    index: usize,
  ) -> usize {
    drop(self.remove(index));
    index
  }
}

#[cfg(test)]
mod tests {
  use std::panic::{self, AssertUnwindSafe};

  use super::*;
  use crate::probe::{self, Probe};

  fn values(array: &DynamicArray<Probe>) -> Vec<u32> {
    array.iter().map(|probe| probe.0).collect()
  }

  #[test]
  fn test_walkthrough_scenario() {
    let mut array = DynamicArray::<i32>::new();
    array.push(1);
    array.push(2);
    array.push(3);
    assert_eq!(array.as_slice(), &[1, 2, 3]);
    assert_eq!(array.len(), 3);

    assert_eq!(*array.insert(1, 99), 99);
    assert_eq!(array.as_slice(), &[1, 99, 2, 3]);
    assert_eq!(array.len(), 4);

    assert_eq!(array.erase(2), 2);
    assert_eq!(array.as_slice(), &[1, 99, 3]);
    assert_eq!(array.len(), 3);

    let capacity = array.capacity();
    array.resize(1);
    assert_eq!(array.as_slice(), &[1]);
    assert_eq!(array.capacity(), capacity);

    array.resize(4);
    assert_eq!(array.as_slice(), &[1, 0, 0, 0]);
    assert_eq!(array.len(), 4);
  }

  #[test]
  fn test_growth_doubles_from_one() {
    assert_eq!(grown_capacity(0), Ok(1));
    assert_eq!(grown_capacity(1), Ok(2));
    assert_eq!(grown_capacity(24), Ok(48));
    assert_eq!(
      grown_capacity(usize::MAX / 2 + 1),
      Err(StorageError::CapacityOverflow {
        requested: usize::MAX / 2 + 2,
      })
    );
  }

  #[test]
  fn test_push_reallocates_logarithmically() {
    let mut array = DynamicArray::new();
    let mut reallocations = 0;
    let mut capacity = array.capacity();

    for i in 0..1024u32 {
      array.push(i);
      if array.capacity() != capacity {
        reallocations += 1;
        capacity = array.capacity();
      }
    }

    // 0 -> 1 -> 2 -> ... -> 1024
    assert_eq!(reallocations, 11);
    assert_eq!(array.capacity(), 1024);
    assert!(array.iter().copied().eq(0..1024));
  }

  #[test]
  fn test_insert_in_place_at_front_middle_and_end() {
    let mut array: DynamicArray<char> = DynamicArray::with_capacity(8);
    array.push('b');
    array.insert(0, 'a');
    array.insert(2, 'd');
    array.insert(2, 'c');

    assert_eq!(array.as_slice(), &['a', 'b', 'c', 'd']);
    assert_eq!(array.capacity(), 8);
  }

  #[test]
  fn test_insert_with_growth_keeps_order() {
    let mut array: DynamicArray<String> = ["a", "c", "d"].iter().map(|s| s.to_string()).collect();
    assert_eq!(array.len(), array.capacity());

    array.insert(1, "b".to_string());

    assert_eq!(array.as_slice(), &["a", "b", "c", "d"]);
    assert_eq!(array.capacity(), 6);
  }

  #[test]
  fn test_emplace_growth_failure_leaves_array_untouched() {
    let mut array = DynamicArray::from_fn(4, |i| Probe::new(i as u32));
    let address = array.as_ptr();
    probe::fail_after(0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
      array.emplace(1, || Probe::new(99));
    }));

    assert!(result.is_err());
    assert_eq!(values(&array), [0, 1, 2, 3]);
    assert_eq!(array.capacity(), 4);
    assert_eq!(array.as_ptr(), address);
    assert_eq!(probe::live(), 4);
  }

  #[test]
  fn test_emplace_in_place_failure_leaves_array_untouched() {
    let mut array = DynamicArray::from_fn(3, |i| Probe::new(i as u32));
    array.reserve(8);
    probe::fail_after(0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
      array.emplace(0, || Probe::new(99));
    }));

    assert!(result.is_err());
    assert_eq!(values(&array), [0, 1, 2]);
    assert_eq!(array.capacity(), 8);
    assert_eq!(probe::live(), 3);
  }

  #[test]
  fn test_insert_clone_failure_leaves_array_untouched() {
    let mut array = DynamicArray::from_fn(2, |i| Probe::new(i as u32));
    let template = Probe::new(7);
    probe::fail_after(0);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
      array.emplace(2, || template.clone());
    }));

    assert!(result.is_err());
    assert_eq!(values(&array), [0, 1]);
    assert_eq!(array.capacity(), 2);
    assert_eq!(probe::live(), 3);
  }

  #[test]
  fn test_emplace_back_returns_new_element() {
    let mut array = DynamicArray::new();

    let slot = array.emplace_back(|| vec![1, 2]);
    slot.push(3);

    assert_eq!(array[0], [1, 2, 3]);
  }

  #[test]
  fn test_try_push_allocates_first_slot() {
    let mut array = DynamicArray::<u8>::new();

    assert_eq!(array.try_push(1).copied(), Ok(1));
    assert_eq!(array.as_slice(), &[1]);
    assert_eq!(array.capacity(), 1);
  }

  #[test]
  fn test_pop_and_pop_back() {
    let mut array = DynamicArray::from_fn(3, |i| Probe::new(i as u32));

    assert_eq!(array.pop().map(|p| p.0), Some(2));
    array.pop_back();
    assert_eq!(values(&array), [0]);
    assert_eq!(probe::live(), 1);

    array.pop_back();
    assert_eq!(array.pop(), None);
    assert_eq!(array.capacity(), 3);
  }

  #[test]
  #[should_panic(expected = "pop_back on an empty array")]
  fn test_pop_back_empty_panics() {
    DynamicArray::<u8>::new().pop_back();
  }

  #[test]
  fn test_remove_shifts_left() {
    let mut array: DynamicArray<u32> = (10..15).collect();

    assert_eq!(array.remove(0), 10);
    assert_eq!(array.remove(3), 14);
    assert_eq!(array.as_slice(), &[11, 12, 13]);
  }

  #[test]
  fn test_erase_last_returns_end() {
    let mut array = DynamicArray::from_fn(2, |i| Probe::new(i as u32));

    assert_eq!(array.erase(1), array.len());
    assert_eq!(values(&array), [0]);
    assert_eq!(probe::live(), 1);
  }

  #[test]
  #[should_panic(expected = "insertion index (is 2) should be <= len (is 1)")]
  fn test_insert_past_end_panics() {
    let mut array = DynamicArray::new();
    array.push(0u8);
    array.insert(2, 1);
  }

  #[test]
  #[should_panic(expected = "removal index (is 0) should be < len (is 0)")]
  fn test_remove_from_empty_panics() {
    DynamicArray::<u8>::new().remove(0);
  }

  mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
      Push(i32),
      Insert(usize, i32),
      Erase(usize),
      Pop,
      Resize(usize),
      Reserve(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
      prop_oneof![
        any::<i32>().prop_map(Op::Push),
        (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Insert(at, v)),
        any::<usize>().prop_map(Op::Erase),
        Just(Op::Pop),
        (0usize..48).prop_map(Op::Resize),
        (0usize..96).prop_map(Op::Reserve),
      ]
    }

    proptest! {
      #[test]
      fn matches_vec_model(ops in proptest::collection::vec(op(), 1..64)) {
        let mut array = DynamicArray::new();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
          match op {
            Op::Push(v) => {
              array.push(v);
              model.push(v);
            }
            Op::Insert(at, v) => {
              let at = at % (model.len() + 1);
              array.insert(at, v);
              model.insert(at, v);
            }
            Op::Erase(at) => {
              if !model.is_empty() {
                let at = at % model.len();
                array.erase(at);
                model.remove(at);
              }
            }
            Op::Pop => {
              prop_assert_eq!(array.pop(), model.pop());
            }
            Op::Resize(n) => {
              let capacity = array.capacity();
              array.resize(n);
              model.resize(n, 0);
              if n <= capacity {
                prop_assert_eq!(array.capacity(), capacity);
              }
            }
            Op::Reserve(n) => {
              let before = array.capacity();
              array.reserve(n);
              prop_assert_eq!(array.capacity(), before.max(n));
            }
          }

          prop_assert!(array.len() <= array.capacity());
          prop_assert_eq!(array.as_slice(), model.as_slice());
        }
      }

      #[test]
      fn insert_then_erase_restores(
        initial in proptest::collection::vec(any::<u16>(), 0..32),
        at in any::<usize>(),
        value in any::<u16>(),
      ) {
        let mut array: DynamicArray<u16> = initial.iter().copied().collect();
        let at = at % (initial.len() + 1);

        array.insert(at, value);
        let next = array.erase(at);

        prop_assert_eq!(next, at);
        prop_assert_eq!(array.as_slice(), initial.as_slice());
      }
    }
  }
}
