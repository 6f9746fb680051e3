use smallvec::SmallVec;
use understudy_invocation::{Invocation, Pattern};
use understudy_primitives::Value;

use crate::VerificationMode;

/// A passed verification and the records it matched, oldest first.
#[derive(Debug, Clone)]
pub struct Verified {
	mode: VerificationMode,
	matches: Vec<Invocation>,
}

impl Verified {
	pub fn mode(&self) -> VerificationMode {
		self.mode
	}

	pub fn count(&self) -> usize {
		self.matches.len()
	}

	pub fn invocations(&self) -> &[Invocation] {
		&self.matches
	}

	/// Arguments seen at `position` across the matched calls, in call order.
	pub fn captured(&self, position: usize) -> Vec<Value> {
		self.matches.iter().filter_map(|inv| inv.argument(position).cloned()).collect()
	}

	/// The argument at `position` of the most recent matched call.
	pub fn last_captured(&self, position: usize) -> Option<Value> {
		self.matches.last().and_then(|inv| inv.argument(position).cloned())
	}
}

/// A record for the verified operation that some matcher rejected.
#[derive(Debug, Clone)]
pub struct NearMiss {
	pub invocation: Invocation,
	/// Positions whose matcher rejected the argument.
	pub rejected: SmallVec<[usize; 4]>,
}

/// Data describing a failed verification. Formatting is left to reporters.
#[derive(Debug, Clone)]
pub struct VerificationFailure {
	pub pattern: Pattern,
	pub mode: VerificationMode,
	pub actual: usize,
	pub near_misses: Vec<NearMiss>,
}

/// Counts the records accepted by `pattern` and checks `mode`.
///
/// On failure, up to `near_miss_limit` records for the same operation that
/// were rejected by at least one matcher are attached for diagnostics.
pub fn verify<'a>(
	records: impl IntoIterator<Item = &'a Invocation>,
	pattern: &Pattern,
	mode: VerificationMode,
	near_miss_limit: usize,
) -> Result<Verified, VerificationFailure> {
	let mut matches = Vec::new();
	let mut near_misses = Vec::new();

	for invocation in records {
		match pattern.rejected_positions(invocation) {
			Some(rejected) if rejected.is_empty() => matches.push(invocation.clone()),
			Some(rejected) if near_misses.len() < near_miss_limit => near_misses.push(NearMiss {
				invocation: invocation.clone(),
				rejected,
			}),
			_ => {}
		}
	}

	let actual = matches.len();
	if mode.is_satisfied_by(actual) {
		tracing::debug!(pattern = %pattern, %mode, actual, "verification passed");
		return Ok(Verified { mode, matches });
	}

	tracing::debug!(pattern = %pattern, %mode, actual, near_misses = near_misses.len(), "verification failed");
	Err(VerificationFailure {
		pattern: pattern.clone(),
		mode,
		actual,
		near_misses,
	})
}
