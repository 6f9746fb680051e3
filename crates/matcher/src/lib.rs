//! Argument matchers.
//!
//! A [`Matcher`] is a pure predicate over one call argument. Patterns hold one
//! matcher per argument position. Literals supplied while declaring a stub or
//! verification are wrapped in [`Equals`], one position at a time, through the
//! [`Arg`] builder; anything else comes from the [`builtins`].

use std::fmt;
use std::sync::Arc;

use understudy_primitives::Value;

mod arg;
pub mod builtins;


pub use arg::{Arg, resolve_matchers};
pub use builtins::{all_of, any, any_of, arg_that, custom, eq, nil, not, not_nil, same};

/// Predicate over a single argument.
///
/// Implementations must be pure and total: `matches` may be called any number
/// of times, in any order, with any [`Value`] including [`Value::Nil`].
pub trait ArgumentMatcher: Send + Sync {
	fn matches(&self, candidate: &Value) -> bool;

	/// Writes a short human-readable description for diagnostics.
	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Shared handle to an [`ArgumentMatcher`].
#[derive(Clone)]
pub struct Matcher(Arc<dyn ArgumentMatcher>);

impl Matcher {
	pub fn new(matcher: impl ArgumentMatcher + 'static) -> Self {
		Self(Arc::new(matcher))
	}

	/// The implicit wrapper for literals.
	pub fn equals(literal: Value) -> Self {
		Self::new(Equals(literal))
	}

	pub fn matches(&self, candidate: &Value) -> bool {
		self.0.matches(candidate)
	}
}

impl fmt::Display for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.describe(f)
	}
}

impl fmt::Debug for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Matcher({self})")
	}
}

/// Value equality against a literal.
///
/// Uses [`Value`]'s `PartialEq`: structural for value variants, numeric across
/// integer and float variants, the payload's own `PartialEq` for objects.
/// Never identity.
#[derive(Debug, Clone)]
pub struct Equals(pub Value);

impl ArgumentMatcher for Equals {
	fn matches(&self, candidate: &Value) -> bool {
		self.0 == *candidate
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", self.0)
	}
}

/// Caller-supplied predicate over raw values.
pub struct Custom<F> {
	description: String,
	predicate: F,
}

impl<F> Custom<F>
where
	F: Fn(&Value) -> bool + Send + Sync,
{
	pub fn new(description: impl Into<String>, predicate: F) -> Self {
		Self {
			description: description.into(),
			predicate,
		}
	}
}

impl<F> ArgumentMatcher for Custom<F>
where
	F: Fn(&Value) -> bool + Send + Sync,
{
	fn matches(&self, candidate: &Value) -> bool {
		(self.predicate)(candidate)
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.description)
	}
}
