//! The interception path every substitute call takes.
//!
//! Order of checks: the substitute's own state must be free (no re-entry from
//! a matcher or a stub closure), it must not be disposed, and the operation
//! must be one of its capabilities. Then the context decides: while a
//! declaration is pending the call becomes its template, otherwise it is
//! recorded and answered. A template call that fails abandons the
//! declaration and its error is handed back by `finish`.

use std::sync::Arc;

use understudy_invocation::{Arguments, Invocation};
use understudy_primitives::{OperationId, ReturnKind};
use understudy_registry::Outcome;

use crate::context::{Declaration, Template};
use crate::error::{EngineError, Result};
use crate::handle::{Substitute, SubstituteShared};

pub(crate) enum Dispatched {
	/// Taken as the template of a pending declaration. Nothing was recorded.
	Captured { returns: ReturnKind },
	Answered { outcome: Outcome, returns: ReturnKind },
}

pub(crate) fn dispatch(substitute: &Substitute, operation: OperationId, arguments: Arguments) -> Result<Dispatched> {
	let shared = &substitute.shared;
	let id = shared.id;
	let mut state = shared.state.try_lock().ok_or_else(|| abandon_pending(shared, EngineError::Reentrant { substitute: id }))?;
	if substitute.is_disposed() {
		return Err(abandon_pending(shared, EngineError::Disposed { substitute: id }));
	}
	let returns = match shared.capabilities.get(&operation) {
		Some(member) => member.returns(),
		None => {
			return Err(abandon_pending(
				shared,
				EngineError::UnknownOperation {
					substitute: id,
					capabilities: shared.capabilities.name().to_owned(),
					operation,
				},
			));
		}
	};

	{
		let mut declaration = shared.context.declaration.try_lock().ok_or(EngineError::ContextBusy)?;
		match std::mem::replace(&mut *declaration, Declaration::Idle) {
			Declaration::Idle => {}
			abandoned @ Declaration::Abandoned { .. } => *declaration = abandoned,
			Declaration::Pending { kind, template: Some(_), .. } => {
				tracing::debug!(substitute = %id, %operation, %kind, "second template call; declaration abandoned");
				let error = EngineError::ExtraTemplateCall {
					kind,
					substitute: id,
					operation,
				};
				*declaration = Declaration::Abandoned { error: error.clone() };
				return Err(error);
			}
			Declaration::Pending {
				kind,
				target: Some(expected),
				template: None,
			} if expected != id => {
				tracing::debug!(substitute = %id, %expected, %kind, "template call on wrong substitute; declaration abandoned");
				let error = EngineError::WrongTarget { kind, expected, found: id };
				*declaration = Declaration::Abandoned { error: error.clone() };
				return Err(error);
			}
			Declaration::Pending { kind, target, template: None } => {
				tracing::trace!(substitute = %id, %operation, %kind, "template call captured");
				*declaration = Declaration::Pending {
					kind,
					target,
					template: Some(Template {
						substitute: Arc::downgrade(shared),
						id,
						operation,
						arguments,
					}),
				};
				return Ok(Dispatched::Captured { returns });
			}
		}
	}

	let sequence = shared.context.next_sequence();
	let invocation = Invocation::new(id, operation, arguments, sequence);
	state.ledger.append(invocation.clone());
	let response = state.stubs.resolve(invocation.operation(), invocation.arguments());
	tracing::trace!(substitute = %id, sequence, call = %invocation, stubbed = response.is_some(), "call recorded");

	// Responses run with the state still held, so a closure calling back into
	// this substitute fails with `Reentrant`.
	let outcome = response.map_or(Outcome::Default, |response| response.execute(&invocation));
	if substitute.is_disposed() {
		// Disposed from inside its own response; `dispose` could not take the lock.
		state.ledger.clear();
		state.stubs.clear();
		tracing::debug!(substitute = %id, "records released after disposal during a call");
	}
	drop(state);
	Ok(Dispatched::Answered { outcome, returns })
}

/// A call that fails before reaching the context still ends a pending
/// declaration, so the next ordinary call is recorded instead of captured.
/// `finish` reports `error`.
fn abandon_pending(shared: &SubstituteShared, error: EngineError) -> EngineError {
	if let Some(mut declaration) = shared.context.declaration.try_lock()
		&& let Declaration::Pending { kind, .. } = &*declaration
	{
		tracing::debug!(substitute = %shared.id, %kind, %error, "template call failed; declaration abandoned");
		*declaration = Declaration::Abandoned { error: error.clone() };
	}
	error
}
