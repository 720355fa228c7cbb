use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dependents::{propagate, Dependents};
use crate::error::Result;
use crate::signal::{Change, ChangeHandler, PropertyHandler, Signals, SubscriptionId};
use crate::Dependent;

pub(crate) type Equality<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// State shared by both cell kinds: the stored value, the value it replaced,
/// the equality predicate, the dependents and the change signals.
pub(crate) struct CellState<T> {
	pub name: &'static str,
	value: RefCell<T>,
	previous: RefCell<T>,
	equality: RefCell<Option<Equality<T>>>,
	dependents: RefCell<Dependents>,
	signals: Signals<T>,
}

impl<T> CellState<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(name: &'static str, value: T) -> Self {
		CellState {
			name,
			previous: RefCell::new(value.clone()),
			value: RefCell::new(value),
			equality: RefCell::new(None),
			dependents: RefCell::new(Dependents::new()),
			signals: Signals::default(),
		}
	}

	/// Makes every computation on the watch stack a dependent of this cell.
	pub fn track(&self) {
		self.dependents.borrow_mut().register_active();
	}

	/// Same as [`CellState::track`] for a computation reading itself.
	pub fn track_except(&self, cell: &Weak<dyn Dependent>) {
		self.dependents.borrow_mut().register_active_except(cell);
	}

	pub fn current(&self) -> T {
		self.value.borrow().clone()
	}

	pub fn previous(&self) -> T {
		self.previous.borrow().clone()
	}

	pub fn store(&self, value: T) {
		*self.value.borrow_mut() = value;
	}

	pub fn set_previous(&self, value: T) {
		*self.previous.borrow_mut() = value;
	}

	pub fn set_equality(&self, equality: Option<Equality<T>>) {
		*self.equality.borrow_mut() = equality;
	}

	pub fn is_equal(&self, a: &T, b: &T) -> bool {
		let equality = self.equality.borrow().clone();
		match equality {
			Some(equality) => equality(a, b),
			None => a == b,
		}
	}

	/// Stores `value` unless the predicate judges it equal to the current one.
	pub fn accept(&self, value: T) -> Option<Change<T>> {
		let current = self.current();
		if self.is_equal(&current, &value) {
			return None;
		}

		self.store(value.clone());
		self.set_previous(current.clone());
		Some(Change {
			previous: current,
			current: value,
		})
	}

	/// Raises the change signals and fans the change out to the dependents.
	pub fn announce(&self, change: &Change<T>) -> Result<()> {
		self.signals.emit(change);
		let targets = self.dependents.borrow().snapshot();
		propagate(self.name, targets)
	}

	pub fn subscribe(&self, handler: ChangeHandler<T>) -> SubscriptionId {
		self.signals.subscribe(handler)
	}

	pub fn subscribe_property(&self, handler: PropertyHandler) -> SubscriptionId {
		self.signals.subscribe_property(handler)
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.signals.unsubscribe(id)
	}

	pub fn dependent_count(&self) -> usize {
		self.dependents.borrow().len()
	}

	pub fn prune_dropped_dependents(&self) -> usize {
		self.dependents.borrow_mut().prune()
	}
}
