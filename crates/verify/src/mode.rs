use std::fmt;

/// Count predicate applied to the number of matching invocations.
///
/// `Never` is `Exactly(0)`, and compares equal to it.
#[derive(Debug, Clone, Copy)]
pub enum VerificationMode {
	Exactly(usize),
	AtLeast(usize),
	AtMost(usize),
	Never,
}

impl VerificationMode {
	/// Folds `Never` into `Exactly(0)`.
	pub fn normalized(self) -> Self {
		match self {
			Self::Never => Self::Exactly(0),
			other => other,
		}
	}

	pub fn is_satisfied_by(self, count: usize) -> bool {
		match self.normalized() {
			Self::Exactly(n) => count == n,
			Self::AtLeast(n) => count >= n,
			Self::AtMost(n) => count <= n,
			Self::Never => unreachable!("normalized away"),
		}
	}
}

impl PartialEq for VerificationMode {
	fn eq(&self, other: &Self) -> bool {
		match (self.normalized(), other.normalized()) {
			(Self::Exactly(a), Self::Exactly(b)) | (Self::AtLeast(a), Self::AtLeast(b)) | (Self::AtMost(a), Self::AtMost(b)) => a == b,
			_ => false,
		}
	}
}

impl Eq for VerificationMode {}

fn times_word(n: usize) -> &'static str {
	if n == 1 { "time" } else { "times" }
}

impl fmt::Display for VerificationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.normalized() {
			Self::Exactly(0) => f.write_str("never"),
			Self::Exactly(n) => write!(f, "exactly {n} {}", times_word(n)),
			Self::AtLeast(n) => write!(f, "at least {n} {}", times_word(n)),
			Self::AtMost(n) => write!(f, "at most {n} {}", times_word(n)),
			Self::Never => unreachable!("normalized away"),
		}
	}
}

pub fn times(n: usize) -> VerificationMode {
	VerificationMode::Exactly(n)
}

/// `times(1)`, the mode of a bare verification.
pub fn once() -> VerificationMode {
	VerificationMode::Exactly(1)
}

pub fn never() -> VerificationMode {
	VerificationMode::Never
}

pub fn at_least(n: usize) -> VerificationMode {
	VerificationMode::AtLeast(n)
}

pub fn at_least_once() -> VerificationMode {
	VerificationMode::AtLeast(1)
}

pub fn at_most(n: usize) -> VerificationMode {
	VerificationMode::AtMost(n)
}
