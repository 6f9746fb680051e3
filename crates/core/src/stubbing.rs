use std::any::Any;
use std::fmt;

use understudy_invocation::{Invocation, Pattern};
use understudy_matcher::Arg;
use understudy_primitives::{ReturnKind, Thrown, ToValue, Value};
use understudy_registry::{EntryId, Response};

use crate::context::Declared;
use crate::error::{EngineError, Result};
use crate::handle::Substitute;

/// A stub declaration waiting for its answers.
///
/// The first `will_*` call registers the entry; each further one appends a
/// consecutive answer to it. Answers are served in order and the last one
/// repeats. A declaration that never gets an answer registers nothing.
pub struct OngoingStubbing {
	substitute: Substitute,
	pattern: Pattern,
	returns: ReturnKind,
	strict: bool,
	entry: Option<EntryId>,
}

impl fmt::Debug for OngoingStubbing {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OngoingStubbing")
			.field("substitute", &self.substitute.id())
			.field("pattern", &format_args!("{}", self.pattern))
			.field("returns", &self.returns)
			.field("entry", &self.entry)
			.finish()
	}
}

impl OngoingStubbing {
	pub(crate) fn new(declared: Declared, strict: bool) -> Result<Self> {
		let pattern = declared.pattern()?;
		let substitute = declared.substitute().clone();
		let returns = substitute
			.capabilities()
			.get(pattern.operation())
			.map_or(ReturnKind::Any, |member| member.returns());
		Ok(Self {
			substitute,
			pattern,
			returns,
			strict,
			entry: None,
		})
	}

	pub fn substitute(&self) -> &Substitute {
		&self.substitute
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	/// Replaces the pattern with one built from an explicit matcher list.
	///
	/// Answers given after this go to a new entry.
	pub fn try_with_args(mut self, args: Vec<Arg>) -> Result<Self> {
		self.pattern = Pattern::from_args(self.pattern.operation().clone(), args)?;
		self.entry = None;
		Ok(self)
	}

	/// Adds `response` as the next answer.
	pub fn try_respond(mut self, response: Response) -> Result<Self> {
		if self.strict
			&& let Response::ReturnValue(value) = &response
			&& !self.returns.accepts(value)
		{
			return Err(EngineError::ReturnKindMismatch {
				operation: self.pattern.operation().clone(),
				expected: self.returns,
				found: format!("{} {value:?}", value.kind_name()),
			});
		}
		let (entry, pattern) = (self.entry, &self.pattern);
		let id = self.substitute.with_state(|state| match entry {
			Some(id) if state.stubs.push_answer(id, response.clone()) => id,
			_ => state.stubs.insert(pattern.clone(), response),
		})?;
		self.entry = Some(id);
		Ok(self)
	}

	#[track_caller]
	fn respond(self, response: Response) -> Self {
		match self.try_respond(response) {
			Ok(stubbing) => stubbing,
			Err(err) => panic!("{err}"),
		}
	}

	/// # Panics
	///
	/// When `value` does not fit the operation's return kind (with strict
	/// return kinds) or the substitute was disposed.
	#[track_caller]
	pub fn will_return(self, value: impl ToValue) -> Self {
		self.respond(Response::ReturnValue(value.to_value()))
	}

	/// Raises `error` at matching calls.
	///
	/// Methods returning `Result<_, E>` get `Err(error)`; others unwind with
	/// the [`Thrown`] payload.
	#[track_caller]
	pub fn will_throw<E>(self, error: E) -> Self
	where
		E: Any + fmt::Debug + Send + Sync,
	{
		self.respond(Response::ThrowError(Thrown::new(error)))
	}

	/// Runs `action` with the live arguments; the call returns the default.
	#[track_caller]
	pub fn will_do(self, action: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
		self.respond(Response::action(action))
	}

	/// Computes the return value from the live invocation.
	#[track_caller]
	pub fn will_answer(self, answer: impl Fn(&Invocation) -> Value + Send + Sync + 'static) -> Self {
		self.respond(Response::answer(answer))
	}

	#[track_caller]
	pub fn will_return_default(self) -> Self {
		self.respond(Response::Default)
	}
}
