pub use enclose::*;

/// Registers an effect, cloning the listed handles into the closure.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let state = mini_reactive::record! { "x" => 1 };
/// let total = Rc::new(Cell::new(0));
///
/// let _sum = mini_reactive::effect!((state, total) => {
///     total.set(total.get() + state.get("x").unwrap_or(0));
/// });
///
/// state.set("x", 2).unwrap();
/// assert_eq!(total.get(), 3);
/// ```
#[macro_export]
macro_rules! effect {
    (( $($d_tt:tt)* ) => $($b:tt)*) => {
        $crate::effect($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    ($($b:tt)+) => {
        $crate::effect(move || { $($b)+ })
    };
}

/// Builds a [`Record`](crate::Record) from `key => value` pairs.
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::observable([$(($key, $value)),+])
    };
}
