use std::any::Any;
use std::fmt::Debug;
use std::rc::Rc;

use crate::cell::{CellState, Equality};
use crate::error::Result;
use crate::signal::{Change, ChangeHandler, PropertyHandler, SubscriptionId};
use crate::value::{Access, Value};
use crate::Computed;

/// A mutable leaf cell.
///
/// Reading it with [`Var::get`] while a computation is evaluating makes that
/// computation (and every computation it is nested in) a dependent of the
/// cell. Writing a value that differs from the current one raises the change
/// signals and re-evaluates the dependents before [`Var::set`] returns.
pub struct Var<T> {
	body: Rc<VarBody<T>>,
}

impl<T: 'static> From<Var<T>> for Rc<dyn Any> {
	fn from(var: Var<T>) -> Self {
		var.body
	}
}

impl<T: 'static> TryFrom<Rc<dyn Any>> for Var<T> {
	type Error = Rc<dyn Any>;
	fn try_from(value: Rc<dyn Any>) -> Result<Self, Self::Error> {
		Rc::downcast::<VarBody<T>>(value).map(|body| Var { body })
	}
}

pub struct VarBody<T> {
	state: CellState<T>,
}

impl<T> Clone for Var<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Default for Var<T>
where
	T: Default + Clone + PartialEq + 'static,
{
	fn default() -> Self {
		Var::new(Default::default())
	}
}

impl<T> Var<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(value: T) -> Self {
		Self::named("<unnamed>", value)
	}

	pub fn named(name: &'static str, value: T) -> Self {
		Var {
			body: Rc::new(VarBody {
				state: CellState::new(name, value),
			}),
		}
	}

	#[must_use]
	pub fn with_equality(self, equality: impl Fn(&T, &T) -> bool + 'static) -> Self {
		self.set_equality(equality);
		self
	}

	pub fn map<F, R>(&self, func: F) -> Computed<R>
	where
		F: Fn(&T) -> R + 'static,
		R: Clone + PartialEq + Default + 'static,
	{
		let this = self.clone();
		Computed::new(move || func(&this.get()))
	}

	#[inline]
	pub fn get(&self) -> T {
		self.body.get()
	}

	/// Reads the value without registering any dependency.
	#[inline]
	pub fn get_once(&self) -> T {
		self.body.state.current()
	}

	/// The value replaced by the last accepted write.
	#[inline]
	pub fn previous(&self) -> T {
		self.body.state.previous()
	}

	#[inline]
	pub fn set(&self, value: T) -> Result<()> {
		self.body.set(value)
	}

	pub fn update(&self, func: impl FnOnce(&mut T)) -> Result<()> {
		let mut value = self.get_once();
		func(&mut value);
		self.set(value)
	}

	/// Replaces the equality predicate used by future writes.
	pub fn set_equality(&self, equality: impl Fn(&T, &T) -> bool + 'static) {
		let equality: Equality<T> = Rc::new(equality);
		self.body.state.set_equality(Some(equality));
	}

	/// Falls back to `PartialEq` for future writes.
	pub fn clear_equality(&self) {
		self.body.state.set_equality(None);
	}

	pub fn on_change(&self, handler: impl Fn(&Change<T>) + 'static) -> SubscriptionId {
		self.body.state.subscribe(Rc::new(handler))
	}

	pub fn on_property_changed(&self, handler: impl Fn(&'static str) + 'static) -> SubscriptionId {
		self.body.state.subscribe_property(Rc::new(handler))
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.body.state.unsubscribe(id)
	}

	pub fn dependent_count(&self) -> usize {
		self.body.state.dependent_count()
	}

	pub fn prune_dropped_dependents(&self) -> usize {
		self.body.state.prune_dropped_dependents()
	}
}

impl<T> VarBody<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn get(&self) -> T {
		self.state.track();
		self.state.current()
	}

	pub fn set(&self, value: T) -> Result<()> {
		let Some(change) = self.state.accept(value) else {
			return Ok(());
		};

		tracing::trace!(cell = self.state.name, "value changed");
		self.state.announce(&change)
	}
}

impl<T> Access<T> for VarBody<T>
where
	T: Clone + PartialEq + 'static,
{
	fn get(&self) -> Result<T> {
		Ok(VarBody::get(self))
	}

	fn subscribe(&self, handler: ChangeHandler<T>) -> SubscriptionId {
		self.state.subscribe(handler)
	}

	fn subscribe_property(&self, handler: PropertyHandler) -> SubscriptionId {
		self.state.subscribe_property(handler)
	}

	fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.state.unsubscribe(id)
	}
}

impl<T> From<Var<T>> for Value<T>
where
	T: Clone + PartialEq + 'static,
{
	fn from(var: Var<T>) -> Self {
		Value::new(var.body)
	}
}

impl<T> Debug for Var<T>
where
	T: Clone + PartialEq + Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.get_once().fmt(f)
	}
}
