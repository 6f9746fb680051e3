use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::value::ToValue;

#[derive(Debug, Clone, PartialEq)]
struct Fault(&'static str);

#[derive(Debug, Clone, Default, PartialEq)]
struct Config {
	depth: u8,
}

crate::opaque_value!(Config => default);

#[test]
fn numeric_responses_coerce_across_widths() {
	assert_eq!(u8::from_value(&Value::Int(99)), Ok(99));
	assert_eq!(i64::from_value(&Value::UInt(7)), Ok(7));
	assert_eq!(f32::from_value(&Value::Int(2)), Ok(2.0));
}

#[test]
fn out_of_range_responses_are_rejected() {
	assert!(matches!(u32::from_value(&Value::Int(-1)), Err(CoercionError::OutOfRange { target: "u32", .. })));
	assert!(matches!(i8::from_value(&Value::Int(300)), Err(CoercionError::OutOfRange { .. })));
}

#[test]
fn mistyped_responses_are_rejected() {
	let err = bool::from_value(&Value::Int(1)).unwrap_err();
	assert_eq!(err.to_string(), "cannot return int 1 as bool");
}

#[test]
fn zero_values() {
	assert_eq!(i32::zero(), 0);
	assert_eq!(f64::zero(), 0.0);
	assert_eq!(String::zero(), "");
	assert_eq!(Vec::<u8>::zero(), Vec::<u8>::new());
	assert_eq!(Option::<i32>::zero(), None);
	assert_eq!(Result::<i32, Fault>::zero(), Ok(0));
	assert_eq!(Config::zero(), Config { depth: 0 });
}

#[test]
fn thrown_payload_becomes_err_for_matching_result() {
	let thrown = Thrown::new(Fault("disk full"));
	assert_eq!(Result::<u8, Fault>::from_thrown(&thrown), Some(Err(Fault("disk full"))));
	assert_eq!(Result::<u8, String>::from_thrown(&thrown), None);
	assert_eq!(u8::from_thrown(&thrown), None);
}

#[test]
fn optional_and_list_responses() {
	assert_eq!(Option::<String>::from_value(&Value::Nil), Ok(None));
	assert_eq!(Option::<String>::from_value(&Value::string("x")), Ok(Some("x".to_string())));
	assert_eq!(Vec::<u8>::from_value(&Value::bytes([1, 2])), Ok(vec![1, 2]));
	assert_eq!(Vec::<i32>::from_value(&vec![3, 4].to_value()), Ok(vec![3, 4]));
}

#[test]
fn shared_payloads_keep_identity_on_return() {
	let shared = Arc::new(Config { depth: 3 });
	let value = shared.to_value();
	let back = Arc::<Config>::from_value(&value).unwrap();
	assert!(Arc::ptr_eq(&shared, &back));
}

#[rstest]
#[case(ReturnKind::Int, Value::UInt(3), true)]
#[case(ReturnKind::Int, Value::Float(3.0), false)]
#[case(ReturnKind::Float, Value::Int(3), true)]
#[case(ReturnKind::Unit, Value::Nil, true)]
#[case(ReturnKind::Unit, Value::Int(0), false)]
#[case(ReturnKind::Object, Value::Nil, true)]
#[case(ReturnKind::Str, Value::Char('a'), false)]
#[case(ReturnKind::Nullable, Value::Bool(true), true)]
fn kinds_accept_plausible_values(#[case] kind: ReturnKind, #[case] value: Value, #[case] expected: bool) {
	assert_eq!(kind.accepts(&value), expected);
}

#[test]
fn default_values_match_their_kind() {
	for kind in [ReturnKind::Int, ReturnKind::UInt, ReturnKind::Float, ReturnKind::Str, ReturnKind::List, ReturnKind::Object] {
		assert!(kind.accepts(&kind.default_value()), "{kind:?}");
	}
	assert_eq!(ReturnKind::Int.default_value(), Value::Int(0));
	assert_eq!(ReturnKind::Bytes.default_value(), Value::bytes(b""));
}
