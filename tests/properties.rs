use std::cell::Cell;
use std::rc::Rc;

use proptest::collection::vec;
use proptest::prelude::*;
use watchcell::{tracker, Computed, Var};

proptest! {
	#[test]
	fn observable_reads_are_idempotent(value in any::<i64>()) {
		let cell = Var::new(value);
		prop_assert_eq!(cell.get(), cell.get());
	}

	#[test]
	fn only_unequal_writes_are_signalled(value in any::<i64>(), other in any::<i64>()) {
		let cell = Var::new(value);
		let fired = Rc::new(Cell::new(0_usize));
		cell.on_change({
			let fired = fired.clone();
			move |_| fired.set(fired.get() + 1)
		});

		cell.set(value).unwrap();
		prop_assert_eq!(fired.get(), 0);

		cell.set(other).unwrap();
		prop_assert_eq!(fired.get(), usize::from(other != value));
	}

	#[test]
	fn computed_sum_tracks_every_write(
		initial in vec(any::<i32>(), 1..8),
		writes in vec((0_usize..8, any::<i32>()), 0..24),
	) {
		let cells: Vec<Var<i64>> = initial.iter().map(|v| Var::new(i64::from(*v))).collect();
		let sum = Computed::new({
			let cells = cells.clone();
			move || cells.iter().map(Var::get).sum::<i64>()
		});

		for (index, value) in writes {
			let cell = &cells[index % cells.len()];
			cell.set(i64::from(value)).unwrap();

			let expected: i64 = cells.iter().map(Var::get_once).sum();
			prop_assert_eq!(sum.current(), expected);
			prop_assert!(!tracker::is_evaluating());
		}

		for cell in &cells {
			prop_assert_eq!(cell.dependent_count(), 1);
		}
	}
}
