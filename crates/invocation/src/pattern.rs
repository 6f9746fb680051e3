use std::fmt;

use smallvec::SmallVec;
use understudy_matcher::{Arg, Matcher, resolve_matchers};
use understudy_primitives::{OperationId, Value};

use crate::Invocation;

/// A matcher list whose length disagrees with the operation's arity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("pattern for {operation} has {found} matchers, expected {expected}", expected = .operation.arity())]
pub struct ArityMismatch {
	pub operation: OperationId,
	pub found: usize,
}

/// An operation plus one matcher per argument position.
///
/// Shared by the stub registry (which answers live calls) and verification
/// (which counts ledger entries); both use [`Pattern::accepts`].
#[derive(Debug, Clone)]
pub struct Pattern {
	operation: OperationId,
	matchers: Vec<Matcher>,
}

impl Pattern {
	pub fn new(operation: OperationId, matchers: Vec<Matcher>) -> Result<Self, ArityMismatch> {
		if matchers.len() != operation.arity() {
			return Err(ArityMismatch {
				found: matchers.len(),
				operation,
			});
		}
		Ok(Self { operation, matchers })
	}

	/// Builds a pattern from declaration positions, wrapping literals.
	pub fn from_args(operation: OperationId, args: impl IntoIterator<Item = Arg>) -> Result<Self, ArityMismatch> {
		Self::new(operation, resolve_matchers(args))
	}

	/// Builds the exact-match pattern for captured template arguments.
	pub fn from_literals(operation: OperationId, arguments: &[Value]) -> Result<Self, ArityMismatch> {
		Self::from_args(operation, arguments.iter().cloned().map(Arg::Literal))
	}

	pub fn operation(&self) -> &OperationId {
		&self.operation
	}

	pub fn matchers(&self) -> &[Matcher] {
		&self.matchers
	}

	/// True when the operation is identical and every matcher accepts its
	/// positional argument.
	pub fn accepts(&self, operation: &OperationId, arguments: &[Value]) -> bool {
		self.operation == *operation
			&& arguments.len() == self.matchers.len()
			&& self.matchers.iter().zip(arguments).all(|(m, arg)| m.matches(arg))
	}

	pub fn accepts_invocation(&self, invocation: &Invocation) -> bool {
		self.accepts(invocation.operation(), invocation.arguments())
	}

	/// Positions whose matcher rejects the invocation, or `None` when the
	/// invocation is for another operation altogether.
	pub fn rejected_positions(&self, invocation: &Invocation) -> Option<SmallVec<[usize; 4]>> {
		if self.operation != *invocation.operation() || invocation.arguments().len() != self.matchers.len() {
			return None;
		}
		Some(
			self.matchers
				.iter()
				.zip(invocation.arguments())
				.enumerate()
				.filter(|(_, (m, arg))| !m.matches(arg))
				.map(|(i, _)| i)
				.collect(),
		)
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.operation.name())?;
		for (i, m) in self.matchers.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{m}")?;
		}
		f.write_str(")")
	}
}
