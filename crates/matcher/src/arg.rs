use understudy_primitives::{ToValue, Value};

use crate::Matcher;

/// One argument position of a declaration: a literal or an explicit matcher.
#[derive(Debug, Clone)]
pub enum Arg {
	Literal(Value),
	Matcher(Matcher),
}

impl Arg {
	/// Wraps literals in `Equals`; matchers pass through.
	pub fn into_matcher(self) -> Matcher {
		match self {
			Self::Literal(value) => Matcher::equals(value),
			Self::Matcher(matcher) => matcher,
		}
	}
}

impl From<Matcher> for Arg {
	fn from(matcher: Matcher) -> Self {
		Self::Matcher(matcher)
	}
}

impl<T: ToValue> From<T> for Arg {
	fn from(literal: T) -> Self {
		Self::Literal(literal.to_value())
	}
}

/// Resolves a declaration's positions into matchers.
///
/// Each position is handled on its own: a literal next to a matcher is still
/// an exact `Equals`, never a wildcard.
pub fn resolve_matchers(args: impl IntoIterator<Item = Arg>) -> Vec<Matcher> {
	args.into_iter().map(Arg::into_matcher).collect()
}

/// Builds a `Vec<Arg>` from a mix of literals and matchers.
///
/// ```ignore
/// let args = args![1, any(), "name"];
/// ```
#[macro_export]
macro_rules! args {
	($($arg:expr),* $(,)?) => {
		::std::vec![$($crate::Arg::from($arg)),*]
	};
}
