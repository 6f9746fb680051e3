use crate::{Invocation, Pattern};

/// Append-only call log of one substitute.
///
/// Records keep strict call order; nothing is reordered or deduplicated.
/// [`Ledger::clear`] exists only for disposal, which drops every captured
/// argument with it.
#[derive(Debug, Default)]
pub struct Ledger {
	records: Vec<Invocation>,
}

impl Ledger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn append(&mut self, invocation: Invocation) {
		self.records.push(invocation);
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Records oldest first.
	pub fn iter(&self) -> std::slice::Iter<'_, Invocation> {
		self.records.iter()
	}

	/// Records accepted by `pattern`, oldest first.
	pub fn matching<'a>(&'a self, pattern: &'a Pattern) -> impl Iterator<Item = &'a Invocation> + 'a {
		self.records.iter().filter(move |inv| pattern.accepts_invocation(inv))
	}

	pub fn clear(&mut self) {
		self.records.clear();
		self.records.shrink_to_fit();
	}
}

impl<'a> IntoIterator for &'a Ledger {
	type Item = &'a Invocation;
	type IntoIter = std::slice::Iter<'a, Invocation>;

	fn into_iter(self) -> Self::IntoIter {
		self.records.iter()
	}
}
