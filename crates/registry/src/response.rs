use std::fmt;
use std::sync::Arc;

use understudy_invocation::Invocation;
use understudy_primitives::{Thrown, Value};

/// Side effect run for `RunAction` responses. Receives the live arguments.
pub type Action = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Computes a return value from the live invocation.
pub type AnswerFn = Arc<dyn Fn(&Invocation) -> Value + Send + Sync>;

/// What a stub does when it matches.
#[derive(Clone)]
pub enum Response {
	ReturnValue(Value),
	ThrowError(Thrown),
	/// Runs the action, then yields the default value.
	RunAction(Action),
	Answer(AnswerFn),
	/// The zero value of the declared return type.
	Default,
}

impl Response {
	pub fn action(action: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
		Self::RunAction(Arc::new(action))
	}

	pub fn answer(answer: impl Fn(&Invocation) -> Value + Send + Sync + 'static) -> Self {
		Self::Answer(Arc::new(answer))
	}

	/// Runs the response against a live call.
	pub fn execute(&self, invocation: &Invocation) -> Outcome {
		match self {
			Self::ReturnValue(value) => Outcome::Value(value.clone()),
			Self::ThrowError(thrown) => Outcome::Thrown(thrown.clone()),
			Self::RunAction(action) => {
				action(invocation.arguments());
				Outcome::Default
			}
			Self::Answer(answer) => Outcome::Value(answer(invocation)),
			Self::Default => Outcome::Default,
		}
	}
}

impl fmt::Debug for Response {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ReturnValue(value) => f.debug_tuple("ReturnValue").field(value).finish(),
			Self::ThrowError(thrown) => f.debug_tuple("ThrowError").field(thrown).finish(),
			Self::RunAction(_) => f.write_str("RunAction(..)"),
			Self::Answer(_) => f.write_str("Answer(..)"),
			Self::Default => f.write_str("Default"),
		}
	}
}

/// Result of executing a response, before conversion to the caller's type.
#[derive(Debug, Clone)]
pub enum Outcome {
	Value(Value),
	Thrown(Thrown),
	/// Resolved by the caller's default-value resolver.
	Default,
}
