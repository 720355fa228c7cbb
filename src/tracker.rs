//! Per-thread record of the computations that are currently evaluating.
//!
//! Every computation on the watch stack is counted rather than flagged, so a
//! computation that re-enters its own evaluation stays active until the
//! outermost evaluation returns, and a computation evaluated inside another
//! one leaves both of them active at the same time. Any cell read while the
//! stack is non-empty becomes a dependency of every active computation.

use std::cell::RefCell;
use std::rc::Weak;

use fxhash::FxHashMap;

use crate::addr::WeakAddr;
use crate::Dependent;

thread_local! {
	static WATCHING: RefCell<FxHashMap<WeakAddr<dyn Dependent>, usize>> =
		RefCell::new(FxHashMap::default());
}

/// Puts `cell` on the current thread's watch stack, or bumps its count.
pub fn enter(cell: &Weak<dyn Dependent>) {
	WATCHING.with(|watching| {
		*watching
			.borrow_mut()
			.entry(WeakAddr::new(cell.clone()))
			.or_insert(0) += 1;
	})
}

/// Drops one count for `cell`, removing it once the count reaches zero.
pub fn leave(cell: &Weak<dyn Dependent>) {
	// The thread may already be tearing down its locals while a guard unwinds.
	let _ = WATCHING.try_with(|watching| {
		let mut watching = watching.borrow_mut();
		let key = WeakAddr::new(cell.clone());
		let Some(count) = watching.get_mut(&key) else {
			return;
		};

		*count = count.saturating_sub(1);
		if *count == 0 {
			watching.remove(&key);
		}

		if watching.is_empty() {
			*watching = FxHashMap::default();
		}
	});
}

/// All computations that are mid-evaluation on this thread, nested ones
/// included.
pub fn active() -> Vec<Weak<dyn Dependent>> {
	WATCHING.with(|watching| {
		watching
			.borrow()
			.keys()
			.map(|addr| (**addr).clone())
			.collect()
	})
}

pub fn active_len() -> usize {
	WATCHING.with(|watching| watching.borrow().len())
}

pub fn is_evaluating() -> bool {
	active_len() > 0
}

/// Keeps a computation on the watch stack for as long as it is alive.
///
/// Leaving happens in `Drop`, so the entry is removed on early returns and
/// while a panic unwinds out of an evaluation function.
pub struct Watch {
	cell: Weak<dyn Dependent>,
}

impl Watch {
	#[must_use]
	pub fn new(cell: Weak<dyn Dependent>) -> Self {
		enter(&cell);
		Watch { cell }
	}
}

impl Drop for Watch {
	fn drop(&mut self) {
		leave(&self.cell)
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::Result;

	struct Probe;

	impl Dependent for Probe {
		fn upstream_changed(&self) -> Result<()> {
			Ok(())
		}

		fn name(&self) -> &'static str {
			"probe"
		}
	}

	fn probe() -> (Rc<Probe>, Weak<dyn Dependent>) {
		let rc = Rc::new(Probe);
		let weak = Rc::downgrade(&rc) as Weak<dyn Dependent>;
		(rc, weak)
	}

	fn contains(cell: &Weak<dyn Dependent>) -> bool {
		let addr = WeakAddr::new(cell.clone());
		active().into_iter().any(|w| WeakAddr::new(w) == addr)
	}

	#[test]
	fn counts_reentrant_entries() {
		let (_keep, cell) = probe();

		enter(&cell);
		enter(&cell);
		assert_eq!(active_len(), 1);

		leave(&cell);
		assert!(contains(&cell));

		leave(&cell);
		assert!(!contains(&cell));
		assert!(!is_evaluating());
	}

	#[test]
	fn nested_cells_are_active_together() {
		let (_outer_keep, outer) = probe();
		let (_inner_keep, inner) = probe();

		let _outer = Watch::new(outer.clone());
		{
			let _inner = Watch::new(inner.clone());
			assert_eq!(active_len(), 2);
			assert!(contains(&outer));
			assert!(contains(&inner));
		}

		assert_eq!(active_len(), 1);
		assert!(contains(&outer));
	}

	#[test]
	fn leaving_an_absent_cell_is_a_no_op() {
		let (_keep, cell) = probe();
		leave(&cell);
		assert_eq!(active_len(), 0);
	}

	#[test]
	fn watch_leaves_while_unwinding() {
		let (_keep, cell) = probe();
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			let _watch = Watch::new(cell.clone());
			panic!("evaluation blew up");
		}));

		assert!(result.is_err());
		assert!(!is_evaluating());
	}

	#[test]
	fn tracking_is_confined_to_the_thread() {
		let (_keep, cell) = probe();
		let _watch = Watch::new(cell);

		let seen = std::thread::spawn(active_len).join().unwrap();
		assert_eq!(seen, 0);
		assert_eq!(active_len(), 1);
	}
}
