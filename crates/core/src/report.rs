//! Verification failure reporting.
//!
//! The engine hands a [`Failure`] to the context's [`FailureReporter`] and
//! never formats anything itself. [`PanicReporter`] fails the test, and
//! [`CollectingReporter`] keeps failures for inspection.

use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::Arc;

use parking_lot::Mutex;
use understudy_invocation::Pattern;
use understudy_primitives::SubstituteId;
use understudy_verify::{NearMiss, VerificationFailure, VerificationMode};

/// A failed verification, with where it was declared.
#[derive(Debug, Clone)]
pub struct Failure {
	substitute: SubstituteId,
	capabilities: String,
	verification: VerificationFailure,
	location: &'static Location<'static>,
}

impl Failure {
	pub(crate) fn new(substitute: SubstituteId, capabilities: String, verification: VerificationFailure, location: &'static Location<'static>) -> Self {
		Self {
			substitute,
			capabilities,
			verification,
			location,
		}
	}

	pub fn substitute(&self) -> SubstituteId {
		self.substitute
	}

	/// Name of the substitute's capability set.
	pub fn capabilities(&self) -> &str {
		&self.capabilities
	}

	pub fn pattern(&self) -> &Pattern {
		&self.verification.pattern
	}

	pub fn mode(&self) -> VerificationMode {
		self.verification.mode
	}

	/// Number of calls the pattern accepted.
	pub fn actual(&self) -> usize {
		self.verification.actual
	}

	pub fn near_misses(&self) -> &[NearMiss] {
		&self.verification.near_misses
	}

	pub fn location(&self) -> &'static Location<'static> {
		self.location
	}
}

impl fmt::Display for Failure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"wanted {} on {} {}, but it was called {}",
			self.pattern(),
			self.substitute,
			self.mode(),
			times(self.actual())
		)
	}
}

fn times(count: usize) -> String {
	match count {
		1 => "1 time".to_owned(),
		n => format!("{n} times"),
	}
}

/// Multi-line report used by [`PanicReporter`].
pub fn render_failure(failure: &Failure) -> String {
	let mut out = format!("verification failed at {}\n", failure.location);
	let _ = writeln!(out, "  wanted: {} on {} ({})", failure.pattern(), failure.substitute, failure.capabilities);
	let _ = writeln!(out, "  times:  {}", failure.mode());
	let _ = write!(out, "  actual: called {}", times(failure.actual()));
	if !failure.near_misses().is_empty() {
		out.push_str("\n  near misses:");
		for miss in failure.near_misses() {
			let positions = miss.rejected.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
			let _ = write!(out, "\n    #{} {} (argument {positions} differs)", miss.invocation.sequence(), miss.invocation);
		}
	}
	out
}

/// Receives verification failures from a context.
pub trait FailureReporter: Send + Sync {
	fn report(&self, failure: Failure);
}

/// Fails the current test by panicking with [`render_failure`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
	fn report(&self, failure: Failure) {
		panic!("{}", render_failure(&failure));
	}
}

/// Keeps failures so a test can assert on them.
///
/// Clones share the same store, so one clone can be handed to the context and
/// another kept by the test.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
	failures: Arc<Mutex<Vec<Failure>>>,
}

impl CollectingReporter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn failures(&self) -> Vec<Failure> {
		self.failures.lock().clone()
	}

	/// Drains the collected failures.
	pub fn take(&self) -> Vec<Failure> {
		std::mem::take(&mut *self.failures.lock())
	}

	pub fn len(&self) -> usize {
		self.failures.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.failures.lock().is_empty()
	}
}

impl FailureReporter for CollectingReporter {
	fn report(&self, failure: Failure) {
		tracing::debug!(substitute = %failure.substitute, pattern = %failure.pattern(), actual = failure.actual(), "verification failure collected");
		self.failures.lock().push(failure);
	}
}
