//! Verification engine.
//!
//! Counts ledger records accepted by a query pattern and checks the count
//! against a [`VerificationMode`]. Unlike stub resolution there is no
//! shadowing: the whole ledger is scanned oldest to newest and every
//! accepted record counts.

mod engine;
mod mode;


pub use engine::{NearMiss, VerificationFailure, Verified, verify};
pub use mode::{VerificationMode, at_least, at_least_once, at_most, never, once, times};
