//! Built-in matcher constructors.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use understudy_primitives::{ArgValue, FromValue, ToValue, Value};

use crate::{ArgumentMatcher, Custom, Equals, Matcher};

struct Anything;

impl ArgumentMatcher for Anything {
	fn matches(&self, _: &Value) -> bool {
		true
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("any")
	}
}

/// Accepts every argument, nil included.
pub fn any() -> Matcher {
	Matcher::new(Anything)
}

/// Explicit equality; the same matcher literals are wrapped in.
pub fn eq(literal: impl ToValue) -> Matcher {
	Matcher::new(Equals(literal.to_value()))
}

struct Same(Value);

impl ArgumentMatcher for Same {
	fn matches(&self, candidate: &Value) -> bool {
		self.0.same_instance(candidate)
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "same({:?})", self.0)
	}
}

/// Identity: accepts only the very instance behind `instance`.
pub fn same<T: ArgValue>(instance: &Arc<T>) -> Matcher {
	Matcher::new(Same(Value::shared(Arc::clone(instance))))
}

/// Accepts only [`Value::Nil`].
pub fn nil() -> Matcher {
	Matcher::new(Custom::new("nil", Value::is_nil))
}

/// Accepts anything but [`Value::Nil`].
pub fn not_nil() -> Matcher {
	Matcher::new(Custom::new("not nil", |value: &Value| !value.is_nil()))
}

struct Not(Matcher);

impl ArgumentMatcher for Not {
	fn matches(&self, candidate: &Value) -> bool {
		!self.0.matches(candidate)
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "not({})", self.0)
	}
}

pub fn not(matcher: Matcher) -> Matcher {
	Matcher::new(Not(matcher))
}

struct Combined {
	matchers: Vec<Matcher>,
	all: bool,
}

impl ArgumentMatcher for Combined {
	fn matches(&self, candidate: &Value) -> bool {
		if self.all {
			self.matchers.iter().all(|m| m.matches(candidate))
		} else {
			self.matchers.iter().any(|m| m.matches(candidate))
		}
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(if self.all { "all_of(" } else { "any_of(" })?;
		for (i, m) in self.matchers.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{m}")?;
		}
		f.write_str(")")
	}
}

/// Accepts when every matcher accepts. Empty accepts everything.
pub fn all_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
	Matcher::new(Combined {
		matchers: matchers.into_iter().collect(),
		all: true,
	})
}

/// Accepts when at least one matcher accepts. Empty accepts nothing.
pub fn any_of(matchers: impl IntoIterator<Item = Matcher>) -> Matcher {
	Matcher::new(Combined {
		matchers: matchers.into_iter().collect(),
		all: false,
	})
}

struct ArgThat<T, F> {
	predicate: F,
	_target: PhantomData<fn() -> T>,
}

impl<T, F> ArgumentMatcher for ArgThat<T, F>
where
	T: FromValue,
	F: Fn(&T) -> bool + Send + Sync,
{
	fn matches(&self, candidate: &Value) -> bool {
		T::from_value(candidate).is_ok_and(|typed| (self.predicate)(&typed))
	}

	fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "arg_that::<{}>", std::any::type_name::<T>())
	}
}

/// Typed predicate. Arguments that do not convert to `T` are rejected.
pub fn arg_that<T, F>(predicate: F) -> Matcher
where
	T: FromValue + 'static,
	F: Fn(&T) -> bool + Send + Sync + 'static,
{
	Matcher::new(ArgThat {
		predicate,
		_target: PhantomData,
	})
}

/// Raw predicate with an explicit description.
pub fn custom<F>(description: impl Into<String>, predicate: F) -> Matcher
where
	F: Fn(&Value) -> bool + Send + Sync + 'static,
{
	Matcher::new(Custom::new(description, predicate))
}
