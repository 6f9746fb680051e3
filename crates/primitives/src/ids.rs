use std::borrow::Cow;
use std::fmt;

/// Opaque handle naming one substitute within a mock context.
///
/// Identities are handed out by the owning context from a monotonically
/// increasing counter and are never reused within that context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubstituteId(u64);

impl SubstituteId {
	/// Wraps a raw counter value.
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	/// Returns the raw counter value.
	pub const fn raw(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SubstituteId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "substitute#{}", self.0)
	}
}

/// Name and arity of a callable member.
///
/// Equality is exact on both parts. There is no overload resolution: `add/2`
/// and `add/3` are unrelated operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
	name: Cow<'static, str>,
	arity: usize,
}

impl OperationId {
	/// Creates an operation identifier from any string-like name.
	pub fn new(name: impl Into<Cow<'static, str>>, arity: usize) -> Self {
		Self { name: name.into(), arity }
	}

	/// Creates an operation identifier in const context.
	pub const fn from_static(name: &'static str, arity: usize) -> Self {
		Self {
			name: Cow::Borrowed(name),
			arity,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn arity(&self) -> usize {
		self.arity
	}
}

impl fmt::Display for OperationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.name, self.arity)
	}
}
