//! Stub registry.
//!
//! Each substitute owns one [`StubRegistry`]. Entries are never removed while
//! the substitute lives: declaring a stub for a pattern that is already
//! stubbed adds a newer entry that shadows the old one, because resolution
//! scans newest first and stops at the first entry whose pattern accepts the
//! call.

use understudy_invocation::Pattern;
use understudy_primitives::{OperationId, Value};

mod response;


pub use response::{Action, AnswerFn, Outcome, Response};

/// Handle to a registered entry, used to chain further answers onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

/// A pattern and the answers it serves.
///
/// Answers are served in order; once the last is reached it repeats.
#[derive(Debug)]
pub struct StubEntry {
	id: EntryId,
	pattern: Pattern,
	answers: Vec<Response>,
	served: usize,
}

impl StubEntry {
	pub fn id(&self) -> EntryId {
		self.id
	}

	pub fn pattern(&self) -> &Pattern {
		&self.pattern
	}

	pub fn answers(&self) -> &[Response] {
		&self.answers
	}

	fn next_answer(&mut self) -> Response {
		let index = self.served.min(self.answers.len() - 1);
		self.served = self.served.saturating_add(1);
		self.answers[index].clone()
	}
}

/// Ordered stub entries of one substitute.
#[derive(Debug, Default)]
pub struct StubRegistry {
	entries: Vec<StubEntry>,
	next_id: u32,
}

impl StubRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new entry, shadowing any older entry with the same pattern.
	pub fn insert(&mut self, pattern: Pattern, response: Response) -> EntryId {
		let id = EntryId(self.next_id);
		self.next_id += 1;
		tracing::debug!(operation = %pattern.operation(), pattern = %pattern, ?response, "stub registered");
		self.entries.push(StubEntry {
			id,
			pattern,
			answers: vec![response],
			served: 0,
		});
		id
	}

	/// Appends a consecutive answer to an existing entry.
	///
	/// Returns false when the entry is gone (the registry was cleared).
	pub fn push_answer(&mut self, id: EntryId, response: Response) -> bool {
		let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
			return false;
		};
		tracing::debug!(operation = %entry.pattern.operation(), ?response, answers = entry.answers.len() + 1, "stub answer chained");
		entry.answers.push(response);
		true
	}

	/// Finds the response for a live call, newest entry first.
	///
	/// `None` means no entry matched; the caller answers with the default.
	pub fn resolve(&mut self, operation: &OperationId, arguments: &[Value]) -> Option<Response> {
		let entry = self.entries.iter_mut().rev().find(|e| e.pattern.accepts(operation, arguments))?;
		let response = entry.next_answer();
		tracing::trace!(%operation, entry = entry.id.0, ?response, "stub resolved");
		Some(response)
	}

	pub fn entries(&self) -> &[StubEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
		self.entries.shrink_to_fit();
	}
}
