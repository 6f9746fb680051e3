//! The mock context: declaration state machine and substitute factory.

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use understudy_invocation::{Arguments, Pattern};
use understudy_matcher::Arg;
use understudy_primitives::{OperationId, SubstituteId, Value};
use understudy_verify::{VerificationMode, Verified};

use crate::capability::CapabilitySet;
use crate::config::EngineConfig;
use crate::error::{DeclarationKind, EngineError, Result, VerifyError};
use crate::handle::{Substitute, SubstituteShared};
use crate::report::{Failure, FailureReporter, PanicReporter};
use crate::stubbing::OngoingStubbing;

#[cfg(test)]
mod tests;

pub(crate) struct ContextShared {
	config: EngineConfig,
	reporter: Arc<dyn FailureReporter>,
	pub(crate) declaration: Mutex<Declaration>,
	next_substitute: AtomicU64,
	next_sequence: AtomicU64,
}

impl ContextShared {
	pub(crate) fn next_sequence(&self) -> u64 {
		self.next_sequence.fetch_add(1, Ordering::Relaxed)
	}
}

impl Drop for ContextShared {
	fn drop(&mut self) {
		if let Declaration::Pending { kind, .. } = self.declaration.get_mut() {
			tracing::warn!(%kind, "mock context dropped with a declaration still pending");
		}
	}
}

pub(crate) enum Declaration {
	Idle,
	Pending {
		kind: DeclarationKind,
		/// Substitute the template call must land on, if one was named.
		target: Option<SubstituteId>,
		template: Option<Template>,
	},
	/// The template call failed. Not declaring; `finish` reports the error.
	Abandoned { error: EngineError },
}

/// The single call captured by a pending declaration.
pub(crate) struct Template {
	pub(crate) substitute: Weak<SubstituteShared>,
	pub(crate) id: SubstituteId,
	pub(crate) operation: OperationId,
	pub(crate) arguments: Arguments,
}

/// A finished declaration: the template call and the substitute it hit.
#[derive(Debug)]
pub struct Declared {
	substitute: Substitute,
	operation: OperationId,
	arguments: Arguments,
}

impl Declared {
	pub fn substitute(&self) -> &Substitute {
		&self.substitute
	}

	pub fn operation(&self) -> &OperationId {
		&self.operation
	}

	pub fn arguments(&self) -> &[Value] {
		&self.arguments
	}

	/// Exact-match pattern over the captured arguments.
	pub fn pattern(&self) -> Result<Pattern> {
		Ok(Pattern::from_literals(self.operation.clone(), &self.arguments)?)
	}

	/// Pattern built from an explicit matcher list instead of the captured
	/// arguments. The list must have one entry per parameter.
	pub fn pattern_with(&self, args: Vec<Arg>) -> Result<Pattern> {
		Ok(Pattern::from_args(self.operation.clone(), args)?)
	}
}

/// Owner of the declaration state for one test.
///
/// Cheap to clone; clones share state. Substitutes keep their context alive.
#[derive(Clone)]
pub struct MockContext {
	shared: Arc<ContextShared>,
}

impl Default for MockContext {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for MockContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MockContext")
			.field("config", &self.shared.config)
			.field("declaring", &self.is_declaring())
			.finish_non_exhaustive()
	}
}

/// Returns the context to idle when a declaration closure unwinds.
struct AbandonOnUnwind<'a>(&'a ContextShared);

impl Drop for AbandonOnUnwind<'_> {
	fn drop(&mut self) {
		if std::thread::panicking()
			&& let Some(mut declaration) = self.0.declaration.try_lock()
		{
			*declaration = Declaration::Idle;
		}
	}
}

impl MockContext {
	pub fn new() -> Self {
		Self::with_config(EngineConfig::default())
	}

	pub fn with_config(config: EngineConfig) -> Self {
		Self::with_reporter(config, PanicReporter)
	}

	pub fn with_reporter(config: EngineConfig, reporter: impl FailureReporter + 'static) -> Self {
		Self {
			shared: Arc::new(ContextShared {
				config,
				reporter: Arc::new(reporter),
				declaration: Mutex::new(Declaration::Idle),
				next_substitute: AtomicU64::new(1),
				next_sequence: AtomicU64::new(0),
			}),
		}
	}

	pub fn config(&self) -> &EngineConfig {
		&self.shared.config
	}

	/// Creates a substitute responding to `capabilities`.
	pub fn substitute(&self, capabilities: CapabilitySet) -> Substitute {
		let id = SubstituteId::from_raw(self.shared.next_substitute.fetch_add(1, Ordering::Relaxed));
		tracing::debug!(substitute = %id, capabilities = capabilities.name(), members = capabilities.len(), "substitute created");
		Substitute::new(id, capabilities, Arc::clone(&self.shared))
	}

	/// Disposes a substitute created by this context.
	pub fn stop_mocking(&self, substitute: &Substitute) -> Result<()> {
		self.check_owned(substitute)?;
		substitute.dispose();
		Ok(())
	}

	/// Abandons any pending declaration.
	pub fn reset(&self) {
		let mut declaration = self.shared.declaration.lock();
		match &*declaration {
			Declaration::Pending { kind, .. } => tracing::debug!(%kind, "pending declaration abandoned by reset"),
			Declaration::Abandoned { error } => tracing::debug!(%error, "unreported template failure dropped by reset"),
			Declaration::Idle => {}
		}
		*declaration = Declaration::Idle;
	}

	pub fn is_declaring(&self) -> bool {
		matches!(*self.shared.declaration.lock(), Declaration::Pending { .. })
	}

	/// Starts a stub declaration. The next substitute call, on `target` if
	/// given, becomes its pattern.
	pub fn begin_stubbing(&self, target: Option<&Substitute>) -> Result<()> {
		self.begin(DeclarationKind::Stub, target)
	}

	pub fn finish_stubbing(&self) -> Result<OngoingStubbing> {
		let declared = self.finish(DeclarationKind::Stub)?;
		OngoingStubbing::new(declared, self.shared.config.strict_return_kinds)
	}

	/// Starts a verification declaration. The next substitute call, on
	/// `target` if given, becomes the query pattern and is not recorded.
	pub fn begin_verification(&self, target: Option<&Substitute>) -> Result<()> {
		self.begin(DeclarationKind::Verification, target)
	}

	pub fn finish_verification(&self) -> Result<Declared> {
		self.finish(DeclarationKind::Verification)
	}

	fn begin(&self, kind: DeclarationKind, target: Option<&Substitute>) -> Result<()> {
		if let Some(target) = target {
			self.check_owned(target)?;
			if target.is_disposed() {
				return Err(EngineError::Disposed { substitute: target.id() });
			}
		}
		let mut declaration = self.shared.declaration.try_lock().ok_or(EngineError::ContextBusy)?;
		if let Declaration::Pending { kind: pending, .. } = *declaration {
			*declaration = Declaration::Idle;
			return Err(EngineError::DeclarationPending { pending });
		}
		tracing::trace!(%kind, target = ?target.map(Substitute::id), "declaration started");
		*declaration = Declaration::Pending {
			kind,
			target: target.map(Substitute::id),
			template: None,
		};
		Ok(())
	}

	fn finish(&self, kind: DeclarationKind) -> Result<Declared> {
		let mut declaration = self.shared.declaration.try_lock().ok_or(EngineError::ContextBusy)?;
		match std::mem::replace(&mut *declaration, Declaration::Idle) {
			Declaration::Idle => Err(EngineError::NotDeclaring),
			Declaration::Abandoned { error } => Err(error),
			Declaration::Pending { kind: pending, .. } if pending != kind => Err(EngineError::DeclarationPending { pending }),
			Declaration::Pending { template: None, .. } => Err(EngineError::MissingTemplateCall { kind }),
			Declaration::Pending {
				template: Some(template), ..
			} => {
				let shared = template.substitute.upgrade().ok_or(EngineError::Disposed { substitute: template.id })?;
				Ok(Declared {
					substitute: Substitute { shared },
					operation: template.operation,
					arguments: template.arguments,
				})
			}
		}
	}

	/// Runs `call` as the template of a `kind` declaration.
	fn declare<R>(&self, kind: DeclarationKind, call: impl FnOnce() -> R) -> Result<Declared> {
		self.begin(kind, None)?;
		let guard = AbandonOnUnwind(&self.shared);
		let _ = call();
		drop(guard);
		self.finish(kind)
	}

	fn check_owned(&self, substitute: &Substitute) -> Result<()> {
		if substitute.belongs_to(&self.shared) {
			Ok(())
		} else {
			Err(EngineError::ForeignContext { substitute: substitute.id() })
		}
	}

	/// Declares a stub whose pattern is the single substitute call `call` makes.
	pub fn try_given<R>(&self, call: impl FnOnce() -> R) -> Result<OngoingStubbing> {
		let declared = self.declare(DeclarationKind::Stub, call)?;
		OngoingStubbing::new(declared, self.shared.config.strict_return_kinds)
	}

	/// Like [`try_given`](Self::try_given), matching with `args` instead of
	/// the literal arguments of the call.
	pub fn try_given_args<R>(&self, args: Vec<Arg>, call: impl FnOnce() -> R) -> Result<OngoingStubbing> {
		self.try_given(call)?.try_with_args(args)
	}

	/// # Panics
	///
	/// When the declaration is malformed; see [`EngineError`].
	#[track_caller]
	pub fn given<R>(&self, call: impl FnOnce() -> R) -> OngoingStubbing {
		match self.try_given(call) {
			Ok(stubbing) => stubbing,
			Err(err) => panic!("{err}"),
		}
	}

	/// # Panics
	///
	/// When the declaration is malformed or `args` has the wrong length.
	#[track_caller]
	pub fn given_args<R>(&self, args: Vec<Arg>, call: impl FnOnce() -> R) -> OngoingStubbing {
		match self.try_given_args(args, call) {
			Ok(stubbing) => stubbing,
			Err(err) => panic!("{err}"),
		}
	}

	/// Checks how often the call made by `call` was recorded.
	///
	/// A count mismatch is returned as [`VerifyError::Mismatch`] rather than
	/// reported.
	#[track_caller]
	pub fn try_verify<R>(&self, mode: VerificationMode, call: impl FnOnce() -> R) -> Result<Verified, VerifyError> {
		let declared = self.declare(DeclarationKind::Verification, call)?;
		self.verify_pattern(declared.substitute(), &declared.pattern()?, mode)
	}

	#[track_caller]
	pub fn try_verify_args<R>(&self, mode: VerificationMode, args: Vec<Arg>, call: impl FnOnce() -> R) -> Result<Verified, VerifyError> {
		let declared = self.declare(DeclarationKind::Verification, call)?;
		self.verify_pattern(declared.substitute(), &declared.pattern_with(args)?, mode)
	}

	/// Counts the calls on `substitute` accepted by `pattern` and checks `mode`.
	#[track_caller]
	pub fn verify_pattern(&self, substitute: &Substitute, pattern: &Pattern, mode: VerificationMode) -> Result<Verified, VerifyError> {
		let location = Location::caller();
		self.check_owned(substitute)?;
		let limit = self.shared.config.near_miss_limit;
		let result = substitute.with_state(|state| understudy_verify::verify(&state.ledger, pattern, mode, limit))?;
		result.map_err(|verification| {
			VerifyError::Mismatch(Box::new(Failure::new(
				substitute.id(),
				substitute.capabilities().name().to_owned(),
				verification,
				location,
			)))
		})
	}

	/// Verifies the call made by `call`, handing mismatches to the reporter.
	///
	/// Returns `None` when the reporter was invoked and did not panic.
	///
	/// # Panics
	///
	/// When the declaration is malformed, and on mismatch with the default
	/// [`PanicReporter`].
	#[track_caller]
	pub fn verify<R>(&self, mode: VerificationMode, call: impl FnOnce() -> R) -> Option<Verified> {
		let result = self.try_verify(mode, call);
		self.report(result)
	}

	/// # Panics
	///
	/// As [`verify`](Self::verify), and when `args` has the wrong length.
	#[track_caller]
	pub fn verify_args<R>(&self, mode: VerificationMode, args: Vec<Arg>, call: impl FnOnce() -> R) -> Option<Verified> {
		let result = self.try_verify_args(mode, args, call);
		self.report(result)
	}

	#[track_caller]
	fn report(&self, result: Result<Verified, VerifyError>) -> Option<Verified> {
		match result {
			Ok(verified) => Some(verified),
			Err(VerifyError::Engine(err)) => panic!("{err}"),
			Err(VerifyError::Mismatch(failure)) => {
				self.shared.reporter.report(*failure);
				None
			}
		}
	}
}
