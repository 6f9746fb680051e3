//! Shared vocabulary for the understudy engine.
//!
//! Every argument that crosses a substitute boundary is boxed into a [`Value`],
//! every callable member is named by an [`OperationId`], and every substitute
//! carries a [`SubstituteId`]. Responses travel back out through
//! [`Returnable`], which coerces stubbed values into the Rust type a mocked
//! method declares.

/// Substitute and operation identifiers.
pub mod ids;
/// Return kinds, default values and per-primitive response coercion.
pub mod returnable;
/// Error payloads raised by stubs.
pub mod thrown;
/// Boxed argument values.
pub mod value;

pub use ids::{OperationId, SubstituteId};
pub use returnable::{CoercionError, FromValue, ReturnKind, Returnable};
pub use thrown::Thrown;
pub use value::{ArgValue, ToValue, Value};
