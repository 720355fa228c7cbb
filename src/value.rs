use std::rc::Rc;

use crate::error::Result;
use crate::signal::{Change, ChangeHandler, PropertyHandler, SubscriptionId};

/// A cell of either kind, seen only through what a binding layer needs.
pub struct Value<T> {
	value: Rc<dyn Access<T>>,
}

impl<T> Clone for Value<T> {
	fn clone(&self) -> Self {
		Value {
			value: self.value.clone(),
		}
	}
}

impl<T> Value<T>
where
	T: 'static,
{
	pub fn new(value: Rc<dyn Access<T>>) -> Self {
		Value { value }
	}

	#[inline]
	pub fn get(&self) -> Result<T> {
		self.value.get()
	}

	pub fn on_change(&self, handler: impl Fn(&Change<T>) + 'static) -> SubscriptionId {
		self.value.subscribe(Rc::new(handler))
	}

	pub fn on_property_changed(&self, handler: impl Fn(&'static str) + 'static) -> SubscriptionId {
		self.value.subscribe_property(Rc::new(handler))
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.value.unsubscribe(id)
	}
}

pub trait Access<T>: 'static {
	/// Tracked read: registers the active computations as dependents.
	fn get(&self) -> Result<T>;
	fn subscribe(&self, handler: ChangeHandler<T>) -> SubscriptionId;
	fn subscribe_property(&self, handler: PropertyHandler) -> SubscriptionId;
	fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
