//! Canonical invocation types.
//!
//! Every call that reaches a substitute is captured as an [`Invocation`]
//! before anything else happens to it. Stubs and verifications describe the
//! calls they care about with a [`Pattern`], and each substitute keeps its
//! calls in a [`Ledger`].

use std::fmt;

use smallvec::SmallVec;
use understudy_primitives::{OperationId, SubstituteId, Value};

mod ledger;
mod pattern;

#[cfg(test)]
mod tests;

pub use ledger::Ledger;
pub use pattern::{ArityMismatch, Pattern};

/// Argument storage; most mocked methods take a handful of arguments.
pub type Arguments = SmallVec<[Value; 4]>;

/// Immutable snapshot of one intercepted call.
#[derive(Debug, Clone)]
pub struct Invocation {
	substitute: SubstituteId,
	operation: OperationId,
	arguments: Arguments,
	sequence: u64,
}

impl Invocation {
	/// Captures a call.
	///
	/// `sequence` is the context-wide call ordinal; it orders diagnostics and
	/// has no bearing on matching.
	pub fn new(substitute: SubstituteId, operation: OperationId, arguments: impl Into<Arguments>, sequence: u64) -> Self {
		Self {
			substitute,
			operation,
			arguments: arguments.into(),
			sequence,
		}
	}

	pub fn substitute(&self) -> SubstituteId {
		self.substitute
	}

	pub fn operation(&self) -> &OperationId {
		&self.operation
	}

	pub fn arguments(&self) -> &[Value] {
		&self.arguments
	}

	pub fn argument(&self, position: usize) -> Option<&Value> {
		self.arguments.get(position)
	}

	pub fn sequence(&self) -> u64 {
		self.sequence
	}
}

impl fmt::Display for Invocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.operation.name())?;
		for (i, arg) in self.arguments.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{arg:?}")?;
		}
		f.write_str(")")
	}
}
