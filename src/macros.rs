pub use enclose::*;

/// Builds a [`Computed`](crate::Computed), cloning the listed handles into
/// the evaluation function.
///
/// ```
/// use watchcell::{computed, Var};
///
/// let a = Var::new(2);
/// let b = Var::new(3);
/// let sum = computed!((a, b) a.get() + b.get());
/// assert_eq!(sum.get().unwrap(), 5);
/// ```
#[macro_export]
macro_rules! computed {
    (( $($d_tt:tt)* ) $($b:tt)*) => {
        $crate::Computed::new($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
}

/// Like [`computed!`], for evaluation functions returning a
/// [`Result`](crate::Result).
#[macro_export]
macro_rules! try_computed {
    (( $($d_tt:tt)* ) $($b:tt)*) => {
        $crate::Computed::try_new($crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
}
