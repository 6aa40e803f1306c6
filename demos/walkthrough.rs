use std::fmt::Debug;

use rvector::{DynamicArray, dyn_array};

/// Prints the contents, length, capacity and block address of `array`.
fn print_state<T: Debug>(
  label: &str,
  array: &DynamicArray<T>,
) {
  println!(
    "[{}] {:?}, len = {}, capacity = {}, block = {:?}",
    label,
    array,
    array.len(),
    array.capacity(),
    array.as_ptr(),
  );
}

fn main() {
  let mut array = DynamicArray::new();
  print_state("start", &array);

  // --------------------------------------------------------------------
  // 1) Push three integers. Each full push doubles the capacity:
  //    0 -> 1 -> 2 -> 4. Watch the block address move.
  // --------------------------------------------------------------------
  for value in 1..=3 {
    array.push(value);
    print_state("1 push", &array);
  }

  // --------------------------------------------------------------------
  // 2) Insert into the middle. There is a free slot, so the tail shifts
  //    right inside the same block.
  // --------------------------------------------------------------------
  array.insert(1, 99);
  print_state("2 insert(1, 99)", &array);

  // --------------------------------------------------------------------
  // 3) Erase. The tail shifts left; capacity stays.
  // --------------------------------------------------------------------
  let next = array.erase(2);
  println!("\n[3] erase(2) returned index {next}");
  print_state("3 erase(2)", &array);

  // --------------------------------------------------------------------
  // 4) Shrink, then grow again with default values.
  // --------------------------------------------------------------------
  array.resize(1);
  print_state("4 resize(1)", &array);
  array.resize(4);
  print_state("4 resize(4)", &array);

  // --------------------------------------------------------------------
  // 5) Reserve ahead of time. A smaller request is a no-op.
  // --------------------------------------------------------------------
  array.reserve(32);
  print_state("5 reserve(32)", &array);
  array.reserve(8);
  print_state("5 reserve(8)", &array);

  // --------------------------------------------------------------------
  // 6) Copies are independent, moves leave the source empty.
  // --------------------------------------------------------------------
  let mut copy = array.clone();
  copy[0] = -1;
  print_state("6 original", &array);
  print_state("6 clone", &copy);

  let moved = array.take();
  print_state("6 moved-from", &array);
  print_state("6 moved-to", &moved);

  // --------------------------------------------------------------------
  // 7) A panicking constructor leaves the array as it was.
  // --------------------------------------------------------------------
  let mut words = dyn_array![String::from("kept"); 2];
  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    words.emplace(1, || panic!("constructor failed"));
  }));
  println!("\n[7] emplace panicked: {}", result.is_err());
  print_state("7 after failure", &words);

  println!("\n[8] End of walkthrough.");
}
