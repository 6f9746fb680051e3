use std::any::Any;
use std::fmt;
use std::sync::Arc;


/// Payload that can travel inside [`Value::Object`].
///
/// Blanket-implemented for every `PartialEq + Debug + Send + Sync + 'static`
/// type, which gives opaque arguments value equality without the engine
/// knowing their concrete type.
pub trait ArgValue: Any + fmt::Debug + Send + Sync {
	fn as_any(&self) -> &dyn Any;

	/// Converts a shared payload into a downcastable `Arc`.
	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

	/// Value equality against another payload; false across types.
	fn eq_value(&self, other: &dyn ArgValue) -> bool;

	fn type_name(&self) -> &'static str;
}

impl<T> ArgValue for T
where
	T: Any + fmt::Debug + PartialEq + Send + Sync,
{
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}

	fn eq_value(&self, other: &dyn ArgValue) -> bool {
		other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
	}

	fn type_name(&self) -> &'static str {
		std::any::type_name::<T>()
	}
}

/// A boxed call argument or stubbed return value.
///
/// Cloning is cheap: aggregate and object variants share their allocation, so
/// a cloned [`Value::Object`] still refers to the caller's instance and can be
/// compared by identity with [`Value::same_instance`].
#[derive(Clone, Default)]
pub enum Value {
	/// Absent value (`None`, `()`, a null reference).
	#[default]
	Nil,
	Bool(bool),
	/// Any signed integer, widened.
	Int(i64),
	/// Any unsigned integer, widened.
	UInt(u64),
	Float(f64),
	Char(char),
	Str(Arc<str>),
	Bytes(Arc<[u8]>),
	List(Arc<[Value]>),
	/// Opaque payload compared through its own `PartialEq`.
	Object(Arc<dyn ArgValue>),
}

/// Numeric view used for cross-variant equality.
#[derive(Clone, Copy)]
enum Number {
	Integer(i128),
	Float(f64),
}

/// 2^127, the first float past the top of the i128 range.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

impl Number {
	/// Exact numeric equality. NaN equals NaN so a recorded NaN argument can
	/// be matched again.
	fn equals(self, other: Number) -> bool {
		match (self, other) {
			(Number::Integer(a), Number::Integer(b)) => a == b,
			(Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Number::Integer(i), Number::Float(f)) | (Number::Float(f), Number::Integer(i)) => {
				f.fract() == 0.0 && (-I128_LIMIT..I128_LIMIT).contains(&f) && f as i128 == i
			}
		}
	}
}

impl Value {
	/// Boxes an owned payload.
	pub fn object<T: ArgValue>(payload: T) -> Self {
		Self::Object(Arc::new(payload))
	}

	/// Boxes a shared payload without copying it, preserving identity.
	pub fn shared<T: ArgValue>(payload: Arc<T>) -> Self {
		Self::Object(payload)
	}

	pub fn string(s: impl AsRef<str>) -> Self {
		Self::Str(Arc::from(s.as_ref()))
	}

	pub fn bytes(b: impl AsRef<[u8]>) -> Self {
		Self::Bytes(Arc::from(b.as_ref()))
	}

	pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
		Self::List(items.into_iter().collect())
	}

	pub fn is_nil(&self) -> bool {
		matches!(self, Self::Nil)
	}

	/// Returns true when both values are objects sharing one allocation.
	///
	/// Non-object values never share identity, even when equal.
	pub fn same_instance(&self, other: &Value) -> bool {
		match (self, other) {
			(Self::Object(a), Self::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
			_ => false,
		}
	}

	/// Borrows the payload of an object value as `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Object(payload) => (**payload).as_any().downcast_ref::<T>(),
			_ => None,
		}
	}

	/// Short name of the variant, or the payload type for objects.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Nil => "nil",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::UInt(_) => "uint",
			Self::Float(_) => "float",
			Self::Char(_) => "char",
			Self::Str(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::List(_) => "list",
			Self::Object(payload) => (**payload).type_name(),
		}
	}

	fn as_number(&self) -> Option<Number> {
		match self {
			Self::Int(i) => Some(Number::Integer(i128::from(*i))),
			Self::UInt(u) => Some(Number::Integer(i128::from(*u))),
			Self::Float(f) => Some(Number::Float(*f)),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Nil, Self::Nil) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Char(a), Self::Char(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Bytes(a), Self::Bytes(b)) => a == b,
			(Self::List(a), Self::List(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => (**a).eq_value(&**b),
			(a, b) => match (a.as_number(), b.as_number()) {
				(Some(x), Some(y)) => x.equals(y),
				_ => false,
			},
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Nil => f.write_str("nil"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(i) => write!(f, "{i}"),
			Self::UInt(u) => write!(f, "{u}u"),
			Self::Float(x) => write!(f, "{x:?}"),
			Self::Char(c) => write!(f, "{c:?}"),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::Bytes(b) => write!(f, "b{:?}", &**b),
			Self::List(items) => f.debug_list().entries(items.iter()).finish(),
			Self::Object(payload) => fmt::Debug::fmt(&**payload, f),
		}
	}
}

/// Conversion of a call argument into a [`Value`].
///
/// Implemented for primitives, strings, slices, `Vec`, `Option`, shared
/// `Arc` payloads, and references to any of these. Domain types opt in with
/// [`opaque_value!`](crate::opaque_value).
pub trait ToValue {
	fn to_value(&self) -> Value;
}

macro_rules! to_value_via {
	($variant:ident as $wide:ty: $($t:ty),* $(,)?) => {
		$(
			impl ToValue for $t {
				fn to_value(&self) -> Value {
					Value::$variant(<$wide>::from(*self))
				}
			}
		)*
	};
}

to_value_via!(Int as i64: i8, i16, i32, i64);
to_value_via!(UInt as u64: u8, u16, u32, u64);
to_value_via!(Float as f64: f32, f64);

impl ToValue for isize {
	fn to_value(&self) -> Value {
		Value::Int(*self as i64)
	}
}

impl ToValue for usize {
	fn to_value(&self) -> Value {
		Value::UInt(*self as u64)
	}
}

impl ToValue for bool {
	fn to_value(&self) -> Value {
		Value::Bool(*self)
	}
}

impl ToValue for char {
	fn to_value(&self) -> Value {
		Value::Char(*self)
	}
}

impl ToValue for () {
	fn to_value(&self) -> Value {
		Value::Nil
	}
}

impl ToValue for str {
	fn to_value(&self) -> Value {
		Value::string(self)
	}
}

impl ToValue for String {
	fn to_value(&self) -> Value {
		Value::string(self)
	}
}

impl ToValue for Value {
	fn to_value(&self) -> Value {
		self.clone()
	}
}

impl<T: ToValue> ToValue for [T] {
	fn to_value(&self) -> Value {
		Value::list(self.iter().map(ToValue::to_value))
	}
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
	fn to_value(&self) -> Value {
		self.as_slice().to_value()
	}
}

impl<T: ToValue> ToValue for Vec<T> {
	fn to_value(&self) -> Value {
		self.as_slice().to_value()
	}
}

impl<T: ToValue> ToValue for Option<T> {
	fn to_value(&self) -> Value {
		self.as_ref().map_or(Value::Nil, ToValue::to_value)
	}
}

impl<T: ArgValue> ToValue for Arc<T> {
	fn to_value(&self) -> Value {
		Value::shared(Arc::clone(self))
	}
}

impl<T: ToValue + ?Sized> ToValue for &T {
	fn to_value(&self) -> Value {
		(**self).to_value()
	}
}

/// Lets a domain type travel through substitutes as [`Value::Object`].
///
/// The type must be `Clone + PartialEq + Debug + Send + Sync + 'static`.
/// `opaque_value!(Ty)` implements [`ToValue`] and [`FromValue`]; adding
/// `=> default` also implements [`Returnable`] with `Default::default()` as
/// the zero value.
///
/// [`FromValue`]: crate::FromValue
/// [`Returnable`]: crate::Returnable
#[macro_export]
macro_rules! opaque_value {
	($ty:ty => default) => {
		$crate::opaque_value!($ty);

		impl $crate::Returnable for $ty {
			fn zero() -> Self {
				::std::default::Default::default()
			}
		}
	};
	($ty:ty) => {
		impl $crate::ToValue for $ty {
			fn to_value(&self) -> $crate::Value {
				$crate::Value::object(::std::clone::Clone::clone(self))
			}
		}

		impl $crate::FromValue for $ty {
			const KIND: $crate::ReturnKind = $crate::ReturnKind::Object;

			fn from_value(value: &$crate::Value) -> ::std::result::Result<Self, $crate::CoercionError> {
				value
					.downcast_ref::<$ty>()
					.cloned()
					.ok_or_else(|| $crate::CoercionError::mismatch(::std::any::type_name::<$ty>(), value))
			}
		}
	};
}
