use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An error a stub raises in the caller's control flow.
///
/// Methods returning `Result<T, E>` receive it as `Err(e)` when the payload is
/// an `E`. Any other method unwinds with the `Thrown` itself as the panic
/// payload, so tests can catch and inspect it.
#[derive(Clone)]
pub struct Thrown {
	payload: Arc<dyn Any + Send + Sync>,
	description: Arc<str>,
}

impl Thrown {
	pub fn new<E>(error: E) -> Self
	where
		E: Any + fmt::Debug + Send + Sync,
	{
		let description = format!("{error:?}");
		Self {
			payload: Arc::new(error),
			description: description.into(),
		}
	}

	pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
		self.payload.downcast_ref::<E>()
	}

	/// Debug rendering of the payload, captured at construction.
	pub fn description(&self) -> &str {
		&self.description
	}
}

impl fmt::Debug for Thrown {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Thrown").field(&format_args!("{}", self.description)).finish()
	}
}

impl fmt::Display for Thrown {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "stub raised {}", self.description)
	}
}
