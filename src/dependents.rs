use std::collections::BTreeSet;
use std::rc::Weak;

use crate::addr::WeakAddr;
use crate::error::{Error, Result};
use crate::{tracker, Dependent};

/// Back-references to the computations that read a cell.
///
/// Entries are weak and are only ever added while the cell is alive, so a
/// computation that once read the cell keeps being notified even when its
/// later evaluations take a branch that no longer reads it.
#[derive(Default)]
pub(crate) struct Dependents {
	used_by: BTreeSet<WeakAddr<dyn Dependent>>,
}

impl Dependents {
	pub fn new() -> Self {
		Self {
			used_by: BTreeSet::new(),
		}
	}

	/// Records every computation on this thread's watch stack.
	pub fn register_active(&mut self) {
		for derived in tracker::active() {
			self.used_by.insert(WeakAddr::new(derived));
		}
	}

	/// Like [`Dependents::register_active`], but never records `cell` itself.
	///
	/// A computation that reads itself while evaluating is already on the
	/// watch stack and must not become its own dependent.
	pub fn register_active_except(&mut self, cell: &Weak<dyn Dependent>) {
		let own = WeakAddr::new(cell.clone());
		for derived in tracker::active() {
			let derived = WeakAddr::new(derived);
			if derived != own {
				self.used_by.insert(derived);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.used_by.len()
	}

	/// Forgets entries whose computation has already been dropped.
	///
	/// Live dependents are never removed here.
	pub fn prune(&mut self) -> usize {
		let before = self.used_by.len();
		self.used_by.retain(|derived| !derived.is_dropped());
		before - self.used_by.len()
	}

	/// Copies the current entries so the set can grow while they are notified.
	pub fn snapshot(&self) -> Vec<Weak<dyn Dependent>> {
		self.used_by.iter().map(|derived| (**derived).clone()).collect()
	}
}

/// Notifies each target of an upstream change, depth first.
///
/// A failing target only aborts its own branch: the remaining targets are
/// still notified and the failures are reported once all of them ran.
pub(crate) fn propagate(source: &'static str, targets: Vec<Weak<dyn Dependent>>) -> Result<()> {
	tracing::debug!(source, targets = targets.len(), "propagating change");

	let mut failures = Vec::new();
	for target in targets {
		let Some(target) = target.upgrade() else {
			continue;
		};

		if let Err(error) = target.upstream_changed() {
			tracing::warn!(source, dependent = target.name(), %error, "dependent failed to re-evaluate");
			failures.push(error);
		}
	}

	Error::collect(failures)
}
