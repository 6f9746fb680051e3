//! Return kinds and response coercion.
//!
//! A stubbed response is stored as a [`Value`]; the mocked method converts it
//! back through [`FromValue`]. Numeric responses are converted with checked
//! conversions, so a stub of `Value::Int(99)` serves a method returning `u8`,
//! `i64` or `f32` alike, while `Value::Int(-1)` for a `u32` method is a
//! [`CoercionError::OutOfRange`].
//!
//! [`Returnable`] adds the zero value handed out when no stub matches and the
//! hook through which thrown errors surface as `Err` for `Result` methods.

use std::any::Any;
use std::sync::Arc;

use crate::thrown::Thrown;
use crate::value::{ArgValue, Value};

#[cfg(test)]
mod tests;

/// Declared return type of an operation, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
	/// `()`.
	Unit,
	Bool,
	/// Signed integers.
	Int,
	/// Unsigned integers.
	UInt,
	Float,
	Char,
	Str,
	Bytes,
	List,
	/// Opaque domain objects and shared payloads.
	Object,
	/// `Option<T>`: nil or anything `T` accepts.
	Nullable,
	/// Raw [`Value`] passthrough.
	Any,
}

impl ReturnKind {
	/// The zero value used for `Default` responses of dynamic calls.
	///
	/// 0 for numerics, empty for aggregates, nil for references and unit.
	pub fn default_value(self) -> Value {
		match self {
			Self::Unit | Self::Object | Self::Nullable | Self::Any => Value::Nil,
			Self::Bool => Value::Bool(false),
			Self::Int => Value::Int(0),
			Self::UInt => Value::UInt(0),
			Self::Float => Value::Float(0.0),
			Self::Char => Value::Char('\0'),
			Self::Str => Value::string(""),
			Self::Bytes => Value::bytes(b""),
			Self::List => Value::list([]),
		}
	}

	/// Whether a stubbed value is plausible for this kind.
	///
	/// Range checks happen later, at coercion time.
	pub fn accepts(self, value: &Value) -> bool {
		match self {
			Self::Nullable | Self::Any => true,
			Self::Unit => value.is_nil(),
			Self::Bool => matches!(value, Value::Bool(_)),
			Self::Int | Self::UInt => matches!(value, Value::Int(_) | Value::UInt(_)),
			Self::Float => matches!(value, Value::Int(_) | Value::UInt(_) | Value::Float(_)),
			Self::Char => matches!(value, Value::Char(_)),
			Self::Str => matches!(value, Value::Str(_)),
			Self::Bytes => matches!(value, Value::Bytes(_)),
			Self::List => matches!(value, Value::List(_) | Value::Bytes(_)),
			Self::Object => matches!(value, Value::Object(_) | Value::Nil),
		}
	}
}

/// Failure to turn a stubbed [`Value`] into the declared return type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
	#[error("cannot return {found} as {target}")]
	Mismatch { target: &'static str, found: String },

	#[error("{value} does not fit in {target}")]
	OutOfRange { target: &'static str, value: String },
}

impl CoercionError {
	pub fn mismatch(target: &'static str, found: &Value) -> Self {
		Self::Mismatch {
			target,
			found: format!("{} {found:?}", found.kind_name()),
		}
	}

	fn out_of_range(target: &'static str, value: &Value) -> Self {
		Self::OutOfRange {
			target,
			value: format!("{value:?}"),
		}
	}
}

/// Extraction of a Rust value from a [`Value`].
pub trait FromValue: Sized {
	/// Kind checked against stubbed values at declaration time.
	const KIND: ReturnKind;

	fn from_value(value: &Value) -> Result<Self, CoercionError>;
}

/// A type a mocked method may return.
pub trait Returnable: FromValue {
	/// Value returned when no stub matches.
	fn zero() -> Self;

	/// Converts a thrown error into an ordinary return value.
	///
	/// Only `Result<T, E>` does this, when the payload is an `E`. Everything
	/// else returns `None` and the error unwinds instead.
	fn from_thrown(thrown: &Thrown) -> Option<Self> {
		let _ = thrown;
		None
	}
}

macro_rules! integer_returnable {
	($kind:ident: $($t:ty),* $(,)?) => {
		$(
			impl FromValue for $t {
				const KIND: ReturnKind = ReturnKind::$kind;

				fn from_value(value: &Value) -> Result<Self, CoercionError> {
					match value {
						Value::Int(i) => <$t>::try_from(*i).map_err(|_| CoercionError::out_of_range(stringify!($t), value)),
						Value::UInt(u) => <$t>::try_from(*u).map_err(|_| CoercionError::out_of_range(stringify!($t), value)),
						other => Err(CoercionError::mismatch(stringify!($t), other)),
					}
				}
			}

			impl Returnable for $t {
				fn zero() -> Self {
					0
				}
			}
		)*
	};
}

integer_returnable!(Int: i8, i16, i32, i64, isize);
integer_returnable!(UInt: u8, u16, u32, u64, usize);

macro_rules! float_returnable {
	($($t:ty),* $(,)?) => {
		$(
			impl FromValue for $t {
				const KIND: ReturnKind = ReturnKind::Float;

				fn from_value(value: &Value) -> Result<Self, CoercionError> {
					match value {
						Value::Float(f) => Ok(*f as $t),
						Value::Int(i) => Ok(*i as $t),
						Value::UInt(u) => Ok(*u as $t),
						other => Err(CoercionError::mismatch(stringify!($t), other)),
					}
				}
			}

			impl Returnable for $t {
				fn zero() -> Self {
					0.0
				}
			}
		)*
	};
}

float_returnable!(f32, f64);

impl FromValue for bool {
	const KIND: ReturnKind = ReturnKind::Bool;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::Bool(b) => Ok(*b),
			other => Err(CoercionError::mismatch("bool", other)),
		}
	}
}

impl Returnable for bool {
	fn zero() -> Self {
		false
	}
}

impl FromValue for char {
	const KIND: ReturnKind = ReturnKind::Char;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::Char(c) => Ok(*c),
			other => Err(CoercionError::mismatch("char", other)),
		}
	}
}

impl Returnable for char {
	fn zero() -> Self {
		'\0'
	}
}

impl FromValue for () {
	const KIND: ReturnKind = ReturnKind::Unit;

	fn from_value(_: &Value) -> Result<Self, CoercionError> {
		Ok(())
	}
}

impl Returnable for () {
	fn zero() -> Self {}
}

impl FromValue for String {
	const KIND: ReturnKind = ReturnKind::Str;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::Str(s) => Ok(s.to_string()),
			other => Err(CoercionError::mismatch("String", other)),
		}
	}
}

impl Returnable for String {
	fn zero() -> Self {
		String::new()
	}
}

impl FromValue for Value {
	const KIND: ReturnKind = ReturnKind::Any;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		Ok(value.clone())
	}
}

impl Returnable for Value {
	fn zero() -> Self {
		Value::Nil
	}
}

impl<T: FromValue> FromValue for Vec<T> {
	const KIND: ReturnKind = ReturnKind::List;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::List(items) => items.iter().map(T::from_value).collect(),
			Value::Bytes(bytes) => bytes.iter().map(|b| T::from_value(&Value::UInt(u64::from(*b)))).collect(),
			other => Err(CoercionError::mismatch("Vec", other)),
		}
	}
}

impl<T: FromValue> Returnable for Vec<T> {
	fn zero() -> Self {
		Vec::new()
	}
}

impl<T: FromValue> FromValue for Option<T> {
	const KIND: ReturnKind = ReturnKind::Nullable;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::Nil => Ok(None),
			other => T::from_value(other).map(Some),
		}
	}
}

impl<T: FromValue> Returnable for Option<T> {
	fn zero() -> Self {
		None
	}
}

impl<T: FromValue, E> FromValue for Result<T, E> {
	const KIND: ReturnKind = T::KIND;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		T::from_value(value).map(Ok)
	}
}

impl<T: Returnable, E: Any + Clone> Returnable for Result<T, E> {
	fn zero() -> Self {
		Ok(T::zero())
	}

	fn from_thrown(thrown: &Thrown) -> Option<Self> {
		thrown.downcast_ref::<E>().cloned().map(Err)
	}
}

impl<T: ArgValue> FromValue for Arc<T> {
	const KIND: ReturnKind = ReturnKind::Object;

	fn from_value(value: &Value) -> Result<Self, CoercionError> {
		match value {
			Value::Object(payload) => {
				Arc::clone(payload).into_any_arc().downcast::<T>().map_err(|_| CoercionError::mismatch(std::any::type_name::<T>(), value))
			}
			other => Err(CoercionError::mismatch(std::any::type_name::<T>(), other)),
		}
	}
}
