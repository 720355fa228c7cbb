use std::any::Any;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::cell::{CellState, Equality};
use crate::error::Result;
use crate::signal::{Change, ChangeHandler, PropertyHandler, SubscriptionId};
use crate::tracker::Watch;
use crate::value::{Access, Value};
use crate::Dependent;

/// A derived cell whose value comes from an evaluation function.
///
/// The function runs again on every [`Computed::get`] and on every change
/// of a cell it has ever read; results are never cached. Cells it reads are
/// discovered while it runs, and once discovered they stay dependencies for
/// the lifetime of both cells.
pub struct Computed<T>
where
	T: 'static,
{
	body: Rc<ComputedBody<T>>,
}

impl<T: 'static> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T: 'static> From<Computed<T>> for Rc<dyn Any> {
	fn from(computed: Computed<T>) -> Self {
		computed.body
	}
}

impl<T: 'static> TryFrom<Rc<dyn Any>> for Computed<T> {
	type Error = Rc<dyn Any>;
	fn try_from(value: Rc<dyn Any>) -> Result<Self, Self::Error> {
		Rc::downcast::<ComputedBody<T>>(value).map(|body| Computed { body })
	}
}

pub struct ComputedBody<T>
where
	T: 'static,
{
	state: CellState<T>,
	func: Box<dyn Fn() -> Result<T>>,
	this: Weak<ComputedBody<T>>,
}

impl<T> Computed<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	pub fn new(func: impl Fn() -> T + 'static) -> Self {
		Self::named("<unnamed>", func)
	}

	pub fn named(name: &'static str, func: impl Fn() -> T + 'static) -> Self {
		let computed = Self::build(name, Box::new(move || -> Result<T> { Ok(func()) }));
		// The function cannot fail, so there is nothing to report.
		let _ = computed.body.evaluate();
		computed
	}

	/// Builds a computed from a fallible function.
	///
	/// The first evaluation runs before this returns; its error is handed
	/// back instead of the cell.
	pub fn try_new(func: impl Fn() -> Result<T> + 'static) -> Result<Self> {
		Self::try_named("<unnamed>", func)
	}

	pub fn try_named(name: &'static str, func: impl Fn() -> Result<T> + 'static) -> Result<Self> {
		let computed = Self::build(name, Box::new(func));
		computed.body.evaluate()?;
		Ok(computed)
	}

	fn build(name: &'static str, func: Box<dyn Fn() -> Result<T>>) -> Self {
		Computed {
			body: Rc::new_cyclic(|this| ComputedBody {
				state: CellState::new(name, T::default()),
				func,
				this: this.clone(),
			}),
		}
	}

	#[must_use]
	pub fn with_equality(self, equality: impl Fn(&T, &T) -> bool + 'static) -> Self {
		self.set_equality(equality);
		self
	}

	/// Re-runs the evaluation function and returns its result.
	#[inline]
	pub fn get(&self) -> Result<T> {
		self.body.get()
	}

	/// The result of the most recent evaluation, without evaluating.
	///
	/// After a failed evaluation this is `T::default()`.
	#[inline]
	pub fn current(&self) -> T {
		self.body.state.current()
	}

	/// The value replaced by the last change that was signalled.
	#[inline]
	pub fn previous(&self) -> T {
		self.body.state.previous()
	}

	pub fn set_equality(&self, equality: impl Fn(&T, &T) -> bool + 'static) {
		let equality: Equality<T> = Rc::new(equality);
		self.body.state.set_equality(Some(equality));
	}

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

impl<T> ComputedBody<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	pub fn get(&self) -> Result<T> {
		self.state.track_except(&(self.this.clone() as Weak<dyn Dependent>));
		self.evaluate()
	}

	fn evaluate(&self) -> Result<T> {
		self.state.store(T::default());

		let result = {
			let _watch = Watch::new(self.this.clone() as Weak<dyn Dependent>);
			(self.func)()
		};

		match result {
			Ok(value) => {
				self.state.store(value.clone());
				Ok(value)
			}
			Err(error) => {
				tracing::trace!(cell = self.state.name, %error, "evaluation failed");
				Err(error)
			}
		}
	}
}

impl<T> Dependent for ComputedBody<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	fn upstream_changed(&self) -> Result<()> {
		let before = self.state.current();
		let after = self.evaluate()?;
		if self.state.is_equal(&before, &after) {
			return Ok(());
		}

		tracing::trace!(cell = self.state.name, "computed value changed");
		self.state.set_previous(before.clone());
		self.state.announce(&Change {
			previous: before,
			current: after,
		})
	}

	fn name(&self) -> &'static str {
		self.state.name
	}
}

impl<T> Access<T> for ComputedBody<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	fn get(&self) -> Result<T> {
		ComputedBody::get(self)
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

impl<T> From<Computed<T>> for Value<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	fn from(computed: Computed<T>) -> Self {
		Value::new(computed.body)
	}
}

impl<T> Debug for Computed<T>
where
	T: Clone + PartialEq + Default + Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.current().fmt(f)
	}
}
