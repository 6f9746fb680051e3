use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use understudy_invocation::{Arguments, Invocation, Ledger};
use understudy_primitives::{OperationId, Returnable, SubstituteId, Thrown, Value};
use understudy_registry::{Outcome, StubRegistry};

use crate::capability::CapabilitySet;
use crate::context::ContextShared;
use crate::dispatch::{Dispatched, dispatch};
use crate::error::{EngineError, Result};

/// Reply to a dynamic call made with [`Substitute::invoke`].
#[derive(Debug, Clone)]
pub enum Reply {
	Returned(Value),
	Thrown(Thrown),
}

impl Reply {
	pub fn into_result(self) -> std::result::Result<Value, Thrown> {
		match self {
			Self::Returned(value) => Ok(value),
			Self::Thrown(thrown) => Err(thrown),
		}
	}

	pub fn value(&self) -> Option<&Value> {
		match self {
			Self::Returned(value) => Some(value),
			Self::Thrown(_) => None,
		}
	}
}

/// A stand-in object with no behavior of its own.
///
/// Every call is routed through the dispatch core: it is recorded in the
/// substitute's ledger and answered from its stubs, or captured as a template
/// while a declaration is in progress. Clones share the same substitute.
#[derive(Clone)]
pub struct Substitute {
	pub(crate) shared: Arc<SubstituteShared>,
}

pub(crate) struct SubstituteShared {
	pub(crate) id: SubstituteId,
	pub(crate) capabilities: CapabilitySet,
	pub(crate) context: Arc<ContextShared>,
	pub(crate) disposed: AtomicBool,
	pub(crate) state: Mutex<SubstituteState>,
}

#[derive(Default)]
pub(crate) struct SubstituteState {
	pub(crate) ledger: Ledger,
	pub(crate) stubs: StubRegistry,
}

impl Substitute {
	pub(crate) fn new(id: SubstituteId, capabilities: CapabilitySet, context: Arc<ContextShared>) -> Self {
		Self {
			shared: Arc::new(SubstituteShared {
				id,
				capabilities,
				context,
				disposed: AtomicBool::new(false),
				state: Mutex::new(SubstituteState::default()),
			}),
		}
	}

	pub fn id(&self) -> SubstituteId {
		self.shared.id
	}

	pub fn capabilities(&self) -> &CapabilitySet {
		&self.shared.capabilities
	}

	pub fn is_disposed(&self) -> bool {
		self.shared.disposed.load(Ordering::Acquire)
	}

	/// Dispatches a call and converts the reply to the method's return type.
	///
	/// This is what generated trait implementations call. A thrown error
	/// becomes `Err` when `R` is a `Result` over the thrown type.
	///
	/// # Panics
	///
	/// With the [`EngineError`] message on engine misuse or when the stubbed
	/// value cannot be converted to `R`. A thrown error that `R` cannot carry
	/// unwinds with the [`Thrown`] itself as panic payload.
	#[track_caller]
	pub fn forward<R: Returnable>(&self, operation: OperationId, arguments: impl Into<Arguments>) -> R {
		let dispatched = match dispatch(self, operation.clone(), arguments.into()) {
			Ok(dispatched) => dispatched,
			Err(err) => panic!("{err}"),
		};
		match dispatched {
			Dispatched::Captured { .. } | Dispatched::Answered { outcome: Outcome::Default, .. } => R::zero(),
			Dispatched::Answered {
				outcome: Outcome::Value(value),
				..
			} => match R::from_value(&value) {
				Ok(value) => value,
				Err(source) => panic!(
					"{}",
					EngineError::ReturnTypeMismatch {
						substitute: self.id(),
						operation,
						source,
					}
				),
			},
			Dispatched::Answered {
				outcome: Outcome::Thrown(thrown),
				..
			} => match R::from_thrown(&thrown) {
				Some(value) => value,
				None => std::panic::panic_any(thrown),
			},
		}
	}

	/// Dispatches a call without a static return type.
	///
	/// Default outcomes resolve to the zero value of the member's declared
	/// return kind.
	pub fn invoke(&self, operation: OperationId, arguments: impl Into<Arguments>) -> Result<Reply> {
		Ok(match dispatch(self, operation, arguments.into())? {
			Dispatched::Captured { returns } => Reply::Returned(returns.default_value()),
			Dispatched::Answered { outcome, returns } => match outcome {
				Outcome::Value(value) => Reply::Returned(value),
				Outcome::Thrown(thrown) => Reply::Thrown(thrown),
				Outcome::Default => Reply::Returned(returns.default_value()),
			},
		})
	}

	/// Snapshot of the recorded calls, oldest first.
	pub fn invocations(&self) -> Result<Vec<Invocation>> {
		self.with_state(|state| state.ledger.iter().cloned().collect())
	}

	/// Number of registered stub entries.
	pub fn stub_count(&self) -> Result<usize> {
		self.with_state(|state| state.stubs.len())
	}

	/// Releases recorded calls and stubs and retires the substitute.
	///
	/// Any later call, stub declaration or verification on it fails with
	/// [`EngineError::Disposed`]. Disposing twice is a no-op.
	pub fn dispose(&self) {
		if self.shared.disposed.swap(true, Ordering::AcqRel) {
			tracing::warn!(substitute = %self.id(), "substitute already disposed");
			return;
		}
		match self.shared.state.try_lock() {
			Some(mut state) => {
				let (calls, stubs) = (state.ledger.len(), state.stubs.len());
				state.ledger.clear();
				state.stubs.clear();
				tracing::debug!(substitute = %self.id(), calls, stubs, "substitute disposed");
			}
			None => tracing::debug!(substitute = %self.id(), "substitute disposed mid-call; records are released when the call returns"),
		}
	}

	/// Runs `f` on the live state.
	pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut SubstituteState) -> T) -> Result<T> {
		let substitute = self.id();
		if self.is_disposed() {
			return Err(EngineError::Disposed { substitute });
		}
		let mut state = self.shared.state.try_lock().ok_or(EngineError::Reentrant { substitute })?;
		Ok(f(&mut state))
	}

	pub(crate) fn belongs_to(&self, context: &Arc<ContextShared>) -> bool {
		Arc::ptr_eq(&self.shared.context, context)
	}
}

impl fmt::Debug for Substitute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Substitute")
			.field("id", &self.shared.id)
			.field("capabilities", &self.shared.capabilities.name())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}
