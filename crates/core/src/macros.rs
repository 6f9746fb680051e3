//! Substitute generation for traits.

/// Generates a substitute type implementing a trait.
///
/// Every listed method forwards to [`Substitute::forward`] under the
/// operation `name/arity`. Methods in the `optional { .. }` block are marked
/// optional in the capability set, so a substitute built with
/// `without_optionals` rejects them with
/// [`EngineError::UnknownOperation`]. Only `&self` methods are supported, and
/// argument types must implement [`ToValue`] and return types [`Returnable`].
/// For a trait with `&mut self` methods, write the impl by hand and call
/// [`Substitute::forward`] from each method; it only needs `&self`.
///
/// ```ignore
/// substitute! {
/// 	pub struct MockStore: Store {
/// 		fn get(&self, key: &str) -> Option<String>;
/// 		fn put(&self, key: &str, value: String) -> Result<(), StoreError>;
/// 		optional {
/// 			fn flush(&self);
/// 		}
/// 	}
/// }
/// ```
///
/// [`Substitute::forward`]: crate::Substitute::forward
/// [`EngineError::UnknownOperation`]: crate::EngineError::UnknownOperation
/// [`ToValue`]: crate::ToValue
/// [`Returnable`]: crate::Returnable
#[macro_export]
macro_rules! substitute {
	(
		$(#[$meta:meta])*
		$vis:vis struct $mock:ident: $trait_:path {
			$(
				$(#[$attr:meta])*
				fn $method:ident(&self $(, $arg:ident: $arg_ty:ty)*) $(-> $ret:ty)?;
			)*
			$(
				optional {
					$(
						$(#[$opt_attr:meta])*
						fn $opt_method:ident(&self $(, $opt_arg:ident: $opt_arg_ty:ty)*) $(-> $opt_ret:ty)?;
					)*
				}
			)?
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Debug)]
		$vis struct $mock {
			substitute: $crate::Substitute,
		}

		#[allow(dead_code)]
		impl $mock {
			/// Capability set covering every method of the trait.
			pub fn capabilities() -> $crate::CapabilitySet {
				$crate::CapabilitySet::new(::std::stringify!($trait_))
					$(.with($crate::__substitute_member!(false, $method($($arg),*) $({$ret})?)))*
					$($(.with($crate::__substitute_member!(true, $opt_method($($opt_arg),*) $({$opt_ret})?)))*)?
			}

			pub fn new(context: &$crate::MockContext) -> Self {
				Self {
					substitute: context.substitute(Self::capabilities()),
				}
			}

			/// A substitute that does not respond to the optional methods.
			pub fn without_optionals(context: &$crate::MockContext) -> Self {
				Self {
					substitute: context.substitute(Self::capabilities().without_optionals()),
				}
			}

			pub fn substitute(&self) -> &$crate::Substitute {
				&self.substitute
			}
		}

		impl ::std::convert::AsRef<$crate::Substitute> for $mock {
			fn as_ref(&self) -> &$crate::Substitute {
				&self.substitute
			}
		}

		impl $trait_ for $mock {
			$(
				$crate::__substitute_method! {
					$(#[$attr])*
					fn $method($($arg: $arg_ty),*) $({$ret})?
				}
			)*
			$($(
				$crate::__substitute_method! {
					$(#[$opt_attr])*
					fn $opt_method($($opt_arg: $opt_arg_ty),*) $({$opt_ret})?
				}
			)*)?
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __substitute_method {
	($(#[$attr:meta])* fn $method:ident($($arg:ident: $arg_ty:ty),*) $({$ret:ty})?) => {
		$(#[$attr])*
		#[track_caller]
		fn $method(&self $(, $arg: $arg_ty)*) -> $crate::__substitute_returns!($({$ret})?) {
			self.substitute.forward(
				$crate::OperationId::from_static(::std::stringify!($method), $crate::__substitute_count!($($arg),*)),
				<::std::vec::Vec<$crate::Value>>::from([$($crate::ToValue::to_value(&$arg)),*]),
			)
		}
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __substitute_member {
	($optional:literal, $method:ident($($arg:ident),*) $({$ret:ty})?) => {
		$crate::Member::new(
			$crate::OperationId::from_static(::std::stringify!($method), $crate::__substitute_count!($($arg),*)),
			<$crate::__substitute_returns!($({$ret})?) as $crate::FromValue>::KIND,
		)
		.optional($optional)
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __substitute_returns {
	() => { () };
	({$ret:ty}) => { $ret };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __substitute_count {
	() => { 0usize };
	($head:ident $(, $tail:ident)*) => { 1usize + $crate::__substitute_count!($($tail),*) };
}
