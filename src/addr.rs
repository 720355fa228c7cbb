use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Weak;

/// Weak pointer compared, ordered and hashed by the address of its target.
///
/// Only the data pointer takes part in comparisons, so two handles to the
/// same allocation are equal even when they were coerced through different
/// vtables.
pub struct WeakAddr<T: ?Sized> {
	ptr: Weak<T>,
}

impl<T: ?Sized> WeakAddr<T> {
	pub fn new(ptr: Weak<T>) -> Self {
		WeakAddr { ptr }
	}

	pub fn addr(&self) -> usize {
		Weak::as_ptr(&self.ptr).cast::<()>() as usize
	}

	pub fn is_dropped(&self) -> bool {
		self.ptr.strong_count() == 0
	}
}

impl<T: ?Sized> Clone for WeakAddr<T> {
	fn clone(&self) -> Self {
		WeakAddr {
			ptr: self.ptr.clone(),
		}
	}
}

impl<T: ?Sized> Deref for WeakAddr<T> {
	type Target = Weak<T>;
	fn deref(&self) -> &Self::Target {
		&self.ptr
	}
}

impl<T: ?Sized> PartialEq for WeakAddr<T> {
	fn eq(&self, other: &Self) -> bool {
		self.addr() == other.addr()
	}
}

impl<T: ?Sized> Eq for WeakAddr<T> {}

impl<T: ?Sized> Ord for WeakAddr<T> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.addr().cmp(&other.addr())
	}
}

impl<T: ?Sized> PartialOrd for WeakAddr<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T: ?Sized> Hash for WeakAddr<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.addr())
	}
}
