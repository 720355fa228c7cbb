use std::rc::Rc;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a computed evaluation function.
///
/// The engine never creates these on its own: they come out of evaluation
/// functions and travel back unchanged to whoever triggered the evaluation.
#[derive(Debug, Clone, Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),

	#[error("{0}")]
	Failed(Rc<dyn std::error::Error>),

	/// Several dependents failed while one change was being fanned out.
	#[error("{} dependents failed to re-evaluate", .0.len())]
	Propagation(Vec<Error>),
}

impl Error {
	#[must_use]
	pub fn msg(message: impl Into<String>) -> Self {
		Self::Message(message.into())
	}

	#[must_use]
	pub fn custom(error: impl std::error::Error + 'static) -> Self {
		Self::Failed(Rc::new(error))
	}

	/// Collapses fan-out failures: a single failure is passed through as is.
	pub(crate) fn collect(mut failures: Vec<Error>) -> Result<()> {
		match failures.len() {
			0 => Ok(()),
			1 => Err(failures.remove(0)),
			_ => Err(Error::Propagation(failures)),
		}
	}
}
