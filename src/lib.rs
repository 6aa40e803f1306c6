//! # rvector - A Dynamic Array on Raw Memory
//!
//! This crate provides a growable, contiguous array (`DynamicArray`) built
//! directly on uninitialized memory obtained from the C allocator, instead of
//! on top of `Vec`.
//!
//! ## Overview
//!
//! The array is split into two layers:
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │ DynamicArray<T>                                                      │
//!   │   len, element construction/destruction, growth, insert/erase        │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │ RawStorage<T>                                                │   │
//!   │   │   block + capacity, allocate/free, never touches a T         │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RawStorage` owns memory. `DynamicArray` owns the values living in it.
//!
//! ## Crate Structure
//!
//! ```text
//!   rvector
//!   ├── error      - StorageError
//!   ├── raw        - RawStorage, relocate
//!   ├── array      - DynamicArray core: construction, reserve, resize, clone
//!   ├── edit       - insert / emplace / push / pop / remove / erase
//!   ├── iter       - IntoIter and borrowed iteration
//!   └── macros     - dyn_array!
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rvector::DynamicArray;
//!
//! let mut array = DynamicArray::new();
//! array.push(1);
//! array.push(2);
//! array.push(3);
//!
//! array.insert(1, 99);
//! assert_eq!(array.as_slice(), &[1, 99, 2, 3]);
//!
//! array.erase(2);
//! assert_eq!(array.as_slice(), &[1, 99, 3]);
//!
//! array.resize(4);
//! assert_eq!(array.as_slice(), &[1, 99, 3, 0]);
//! ```
//!
//! ## Growth
//!
//! Inserting into a full array doubles its capacity (starting from one slot):
//!
//! ```text
//!   capacity:  0 ─▶ 1 ─▶ 2 ─▶ 4 ─▶ 8 ─▶ 16 ─▶ ...
//! ```
//!
//! A full block is never grown in place. A new block is filled first, and
//! only once it is complete does it replace the old one:
//!
//! ```text
//!   old block  ┌───┬───┬───┬───┐
//!              │ a │ b │ c │ d │                      (untouched until swap)
//!              └───┴───┴───┴───┘
//!   new block  ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!              │ a │ b │ X │ c │ d │ ? │ ? │ ? │      (built in isolation)
//!              └───┴───┴───┴───┴───┴───┴───┴───┘
//!                          │
//!                          ▼
//!                    swap, free old
//! ```
//!
//! ## Failure Behaviour
//!
//! - **Storage failures** are returned as [`StorageError`] by the `try_*`
//!   operations, with the array unchanged. The other operations panic on
//!   capacity overflow and call `handle_alloc_error` when the allocator refuses.
//! - **Element failures** (a panicking `Default`, `Clone` or constructor
//!   closure) unwind through the operation; every element it had already built
//!   is dropped and the array keeps its previous length and values.
//! - **Contract violations** (index or position out of range, `pop_back` on an
//!   empty array) panic.
//!
//! ## Limitations
//!
//! - **Single owner**: no internal synchronization; `Send`/`Sync` follow `T`
//! - **Unix-only**: memory comes from `libc` (`malloc`, `posix_memalign`, `free`)
//! - **No custom allocators**, no inline storage
//!
//! ## Safety
//!
//! The unsafe surface is confined to `RawStorage` slot access and the
//! `DynamicArray` internals. Slot bounds are checked with `debug_assert!`.

pub mod array;
mod edit;
pub mod error;
mod guard;
pub mod iter;
mod macros;
pub mod raw;

#[cfg(test)]
mod probe;

pub use array::DynamicArray;
pub use error::StorageError;
pub use iter::IntoIter;
pub use raw::RawStorage;
