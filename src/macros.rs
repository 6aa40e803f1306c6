/// Builds a [`DynamicArray`](crate::DynamicArray) like `vec!`.
///
/// # Examples
///
/// ```rust
/// use rvector::dyn_array;
///
/// let empty: rvector::DynamicArray<u8> = dyn_array![];
/// assert!(empty.is_empty());
///
/// let listed = dyn_array![1, 2, 3];
/// assert_eq!(listed.as_slice(), &[1, 2, 3]);
/// assert_eq!(listed.capacity(), 3);
///
/// let repeated = dyn_array![String::from("x"); 2];
/// assert_eq!(repeated.as_slice(), &["x", "x"]);
/// ```
#[macro_export]
macro_rules! dyn_array {
  () => {
    $crate::DynamicArray::new()
  };
  ($elem:expr; $n:expr) => {{
    let elem = $elem;
    $crate::DynamicArray::from_fn($n, |_| ::core::clone::Clone::clone(&elem))
  }};
  ($($x:expr),+ $(,)?) => {{
    let mut array = $crate::DynamicArray::with_capacity([$(stringify!($x)),+].len());
    $(
      array.push($x);
    )+
    array
  }};
}
