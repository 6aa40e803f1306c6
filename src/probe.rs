//! Failure-injecting element type for unit tests.
//!
//! Every `Probe` construction (`new`, `Default`, `Clone`) counts towards an
//! optional failure point, and every drop decrements the live count, so a test
//! can make the k-th construction panic and then check that constructions and
//! destructions balanced.

use std::cell::Cell;

thread_local! {
  static LIVE: Cell<isize> = const { Cell::new(0) };
  static FAIL_AFTER: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Makes the construction after the next `successes` ones panic, once.
pub(crate) fn fail_after(successes: usize) {
  FAIL_AFTER.with(|fail| fail.set(Some(successes)));
}

/// Number of probes constructed on this thread and not yet dropped.
pub(crate) fn live() -> isize {
  LIVE.with(Cell::get)
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Probe(pub u32);

impl Probe {
  pub(crate) fn new(value: u32) -> Self {
    FAIL_AFTER.with(|fail| match fail.get() {
      Some(0) => {
        fail.set(None);
        panic!("probe construction failed");
      }
      Some(n) => fail.set(Some(n - 1)),
      None => {}
    });
    LIVE.with(|live| live.set(live.get() + 1));
    Self(value)
  }
}

impl Default for Probe {
  fn default() -> Self {
    Self::new(0)
  }
}

impl Clone for Probe {
  fn clone(&self) -> Self {
    Self::new(self.0)
  }
}

impl Drop for Probe {
  fn drop(&mut self) {
    LIVE.with(|live| live.set(live.get() - 1));
  }
}
