use std::borrow::Cow;

use rustc_hash::FxHashMap;
use understudy_primitives::{OperationId, ReturnKind};

/// One callable member of a substitute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
	operation: OperationId,
	returns: ReturnKind,
	optional: bool,
}

impl Member {
	pub fn new(operation: OperationId, returns: ReturnKind) -> Self {
		Self {
			operation,
			returns,
			optional: false,
		}
	}

	/// Marks the member as optional. Optional members can be dropped with
	/// [`CapabilitySet::without_optionals`] to model an implementation that
	/// does not provide them.
	pub fn optional(mut self, optional: bool) -> Self {
		self.optional = optional;
		self
	}

	pub fn operation(&self) -> &OperationId {
		&self.operation
	}

	pub fn returns(&self) -> ReturnKind {
		self.returns
	}

	pub fn is_optional(&self) -> bool {
		self.optional
	}
}

/// The operations a substitute responds to.
///
/// Calls for operations outside the set are rejected with
/// [`EngineError::UnknownOperation`](crate::EngineError::UnknownOperation).
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
	name: Cow<'static, str>,
	members: FxHashMap<OperationId, Member>,
}

impl CapabilitySet {
	pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			members: FxHashMap::default(),
		}
	}

	/// Adds a member, replacing any member with the same operation.
	pub fn with(mut self, member: Member) -> Self {
		self.members.insert(member.operation.clone(), member);
		self
	}

	/// Adds a required member.
	pub fn method(self, name: impl Into<Cow<'static, str>>, arity: usize, returns: ReturnKind) -> Self {
		self.with(Member::new(OperationId::new(name, arity), returns))
	}

	/// Adds an optional member.
	pub fn optional_method(self, name: impl Into<Cow<'static, str>>, arity: usize, returns: ReturnKind) -> Self {
		self.with(Member::new(OperationId::new(name, arity), returns).optional(true))
	}

	/// Combines two sets for a substitute implementing several traits.
	///
	/// Members of `self` win when both sets declare the same operation.
	pub fn union(mut self, other: CapabilitySet) -> Self {
		self.name = Cow::Owned(format!("{} + {}", self.name, other.name));
		for (operation, member) in other.members {
			self.members.entry(operation).or_insert(member);
		}
		self
	}

	pub fn without_optionals(mut self) -> Self {
		self.members.retain(|_, member| !member.optional);
		self
	}

	pub fn get(&self, operation: &OperationId) -> Option<&Member> {
		self.members.get(operation)
	}

	pub fn contains(&self, operation: &OperationId) -> bool {
		self.members.contains_key(operation)
	}

	pub fn members(&self) -> impl Iterator<Item = &Member> {
		self.members.values()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn len(&self) -> usize {
		self.members.len()
	}

	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
}
