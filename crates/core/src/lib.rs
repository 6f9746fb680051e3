//! understudy: substitutes for traits in tests.
//!
//! A [`MockContext`] owns the declaration state for one test. Substitutes are
//! created from it, either through the [`substitute!`] generator (which
//! implements a trait by forwarding every method to the dispatch core) or
//! directly from a [`CapabilitySet`] for dynamic use through
//! [`Substitute::invoke`].
//!
//! ```ignore
//! use understudy::prelude::*;
//!
//! trait Calculator {
//! 	fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! substitute! {
//! 	struct MockCalculator: Calculator {
//! 		fn add(&self, a: i32, b: i32) -> i32;
//! 	}
//! }
//!
//! let ctx = MockContext::new();
//! let calc = MockCalculator::new(&ctx);
//! ctx.given(|| calc.add(1, 2)).will_return(99);
//!
//! assert_eq!(calc.add(1, 2), 99);
//! assert_eq!(calc.add(2, 1), 0);
//! ctx.verify(once(), || calc.add(1, 2));
//! ctx.verify(once(), || calc.add(2, 1));
//! ```
//!
//! # Declarations
//!
//! [`MockContext::given`] and [`MockContext::verify`] run a closure that must
//! make exactly one call on a substitute. That call is captured as the
//! pattern of the declaration: it is neither answered from stubs nor logged,
//! so it never counts towards a verification. Literal arguments of the
//! captured call become exact `Equals` matchers; the `*_args` variants take an
//! explicit [`args!`] list mixing literals and matchers instead.

mod capability;
mod config;
mod context;
mod dispatch;
mod error;
mod handle;
mod macros;
mod report;
mod stubbing;

pub use capability::{CapabilitySet, Member};
pub use config::EngineConfig;
pub use context::{Declared, MockContext};
pub use error::{DeclarationKind, EngineError, Result, VerifyError};
pub use handle::{Reply, Substitute};
pub use report::{CollectingReporter, Failure, FailureReporter, PanicReporter, render_failure};
pub use stubbing::OngoingStubbing;
pub use understudy_invocation::{Arguments, Invocation, Pattern};
pub use understudy_matcher::{Arg, ArgumentMatcher, Matcher, args};
pub use understudy_primitives::{ArgValue, CoercionError, FromValue, OperationId, ReturnKind, Returnable, SubstituteId, Thrown, ToValue, Value, opaque_value};
pub use understudy_registry::Response;
pub use understudy_verify::{NearMiss, VerificationFailure, VerificationMode, Verified};

/// Matcher constructors.
pub mod matchers {
	pub use understudy_matcher::builtins::*;
}

/// Verification mode constructors.
pub mod modes {
	pub use understudy_verify::{at_least, at_least_once, at_most, never, once, times};
}

/// Everything a test module usually needs.
pub mod prelude {
	pub use crate::matchers::*;
	pub use crate::modes::*;
	pub use crate::{
		Arg, CapabilitySet, EngineConfig, Member, MockContext, OperationId, ReturnKind, Substitute, ToValue, Value, VerificationMode, args, opaque_value,
		substitute,
	};
}
