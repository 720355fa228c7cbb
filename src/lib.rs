//! Knockout-style observable cells.
//!
//! A [`Var`] holds a value that can be written; a [`Computed`] derives its
//! value from a function that reads other cells. Dependencies are not
//! declared: whatever a computation reads while it evaluates becomes one of
//! its dependencies, and every later write to such a cell re-evaluates the
//! computation synchronously, before the write returns.
//!
//! ```
//! use watchcell::{Computed, Var};
//!
//! let first = Var::new(String::from("Ben"));
//! let last = Var::new(String::from("Siron"));
//! let full = Computed::new({
//! 	let (first, last) = (first.clone(), last.clone());
//! 	move || format!("{} {}", first.get(), last.get())
//! });
//!
//! last.set(String::from("Ziron")).unwrap();
//! assert_eq!(full.current(), "Ben Ziron");
//! ```
//!
//! Cells are reference counted and single threaded. The record of running
//! evaluations is kept per thread, see [`tracker`].

pub mod macros;
pub mod tracker;

mod addr;
mod cell;
mod computed;
mod dependents;
mod error;
mod signal;
mod value;
mod var;

pub use computed::Computed;
pub use error::{Error, Result};
pub use signal::{Change, ChangeHandler, PropertyHandler, SubscriptionId, VALUE_PROPERTY};
pub use value::{Access, Value};
pub use var::Var;

/// A computation that has to be told when a cell it read has changed.
pub trait Dependent: 'static {
	/// Called by an upstream cell after its value changed. The computation
	/// re-evaluates and, if its own value changed, notifies its dependents.
	fn upstream_changed(&self) -> Result<()>;

	fn name(&self) -> &'static str;
}
