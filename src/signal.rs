use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

/// Property name raised on the generic change signal.
pub const VALUE_PROPERTY: &str = "value";

/// Payload of the typed change signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<T> {
	pub previous: T,
	pub current: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type ChangeHandler<T> = Rc<dyn Fn(&Change<T>)>;
pub type PropertyHandler = Rc<dyn Fn(&'static str)>;

pub(crate) struct Signals<T> {
	next_id: Cell<u64>,
	changed: RefCell<SmallVec<[(SubscriptionId, ChangeHandler<T>); 2]>>,
	property: RefCell<SmallVec<[(SubscriptionId, PropertyHandler); 2]>>,
}

impl<T> Default for Signals<T> {
	fn default() -> Self {
		Signals {
			next_id: Cell::new(0),
			changed: RefCell::new(SmallVec::new_const()),
			property: RefCell::new(SmallVec::new_const()),
		}
	}
}

impl<T> Signals<T> {
	fn next_id(&self) -> SubscriptionId {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		SubscriptionId(id)
	}

	pub fn subscribe(&self, handler: ChangeHandler<T>) -> SubscriptionId {
		let id = self.next_id();
		self.changed.borrow_mut().push((id, handler));
		id
	}

	pub fn subscribe_property(&self, handler: PropertyHandler) -> SubscriptionId {
		let id = self.next_id();
		self.property.borrow_mut().push((id, handler));
		id
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut changed = self.changed.borrow_mut();
		if let Some(index) = changed.iter().position(|(it, _)| *it == id) {
			changed.remove(index);
			return true;
		}

		let mut property = self.property.borrow_mut();
		if let Some(index) = property.iter().position(|(it, _)| *it == id) {
			property.remove(index);
			return true;
		}

		false
	}

	/// Raises the typed signal, then the property signal.
	///
	/// Handlers are copied out first: they are free to write other cells or
	/// subscribe to this one while they run.
	pub fn emit(&self, change: &Change<T>) {
		let changed: SmallVec<[ChangeHandler<T>; 2]> =
			self.changed.borrow().iter().map(|(_, h)| h.clone()).collect();
		for handler in changed {
			handler(change);
		}

		let property: SmallVec<[PropertyHandler; 2]> =
			self.property.borrow().iter().map(|(_, h)| h.clone()).collect();
		for handler in property {
			handler(VALUE_PROPERTY);
		}
	}
}
