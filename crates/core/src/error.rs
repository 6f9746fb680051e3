use std::fmt;

use understudy_invocation::ArityMismatch;
use understudy_primitives::{CoercionError, OperationId, ReturnKind, SubstituteId};

use crate::report::Failure;

/// Which declaration a context is collecting a template call for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
	Stub,
	Verification,
}

impl fmt::Display for DeclarationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Stub => "stub",
			Self::Verification => "verification",
		})
	}
}

/// Misuse of the engine or of a substitute.
///
/// Every variant is raised where the misuse happens, before any state is
/// touched. Declaration errors also end the pending declaration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
	#[error("a {pending} declaration is still waiting for its call")]
	DeclarationPending { pending: DeclarationKind },

	#[error("no declaration is in progress")]
	NotDeclaring,

	#[error("{kind} declaration finished without calling a substitute")]
	MissingTemplateCall { kind: DeclarationKind },

	#[error("{kind} declaration made a second call ({operation} on {substitute}); exactly one call is allowed")]
	ExtraTemplateCall {
		kind: DeclarationKind,
		substitute: SubstituteId,
		operation: OperationId,
	},

	#[error("{kind} declaration targets {expected} but {found} was called")]
	WrongTarget {
		kind: DeclarationKind,
		expected: SubstituteId,
		found: SubstituteId,
	},

	#[error("{substitute} ({capabilities}) has no operation {operation}")]
	UnknownOperation {
		substitute: SubstituteId,
		capabilities: String,
		operation: OperationId,
	},

	#[error("{substitute} was disposed")]
	Disposed { substitute: SubstituteId },

	#[error("{substitute} was called while its own state was in use")]
	Reentrant { substitute: SubstituteId },

	#[error("mock context is busy in another call")]
	ContextBusy,

	#[error("{substitute} belongs to another mock context")]
	ForeignContext { substitute: SubstituteId },

	#[error(transparent)]
	ArityMismatch(#[from] ArityMismatch),

	#[error("{operation} returns {expected:?}, cannot stub it with {found}")]
	ReturnKindMismatch {
		operation: OperationId,
		expected: ReturnKind,
		found: String,
	},

	#[error("{operation} on {substitute}: {source}")]
	ReturnTypeMismatch {
		substitute: SubstituteId,
		operation: OperationId,
		source: CoercionError,
	},
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Outcome of a failed `try_verify`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifyError {
	#[error(transparent)]
	Engine(#[from] EngineError),

	#[error("verification failed: {0}")]
	Mismatch(Box<Failure>),
}

impl From<ArityMismatch> for VerifyError {
	fn from(err: ArityMismatch) -> Self {
		Self::Engine(err.into())
	}
}

impl VerifyError {
	/// The verification data, when the failure was a count mismatch.
	pub fn failure(&self) -> Option<&Failure> {
		match self {
			Self::Mismatch(failure) => Some(failure),
			Self::Engine(_) => None,
		}
	}
}
