/// Per-context engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
	/// Most near misses attached to one verification failure.
	pub near_miss_limit: usize,
	/// Reject `will_return` values that cannot be coerced to the operation's
	/// declared return kind when the stub is declared, rather than when a
	/// matching call coerces them.
	pub strict_return_kinds: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			near_miss_limit: 5,
			strict_return_kinds: true,
		}
	}
}

impl EngineConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_near_miss_limit(mut self, limit: usize) -> Self {
		self.near_miss_limit = limit;
		self
	}

	pub fn with_strict_return_kinds(mut self, strict: bool) -> Self {
		self.strict_return_kinds = strict;
		self
	}
}
