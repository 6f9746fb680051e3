use pretty_assertions::assert_eq;
use proptest::prelude::*;
use understudy_matcher::{any, args};
use understudy_primitives::{OperationId, SubstituteId, Value};

use super::*;

const ADD: OperationId = OperationId::from_static("add", 2);

fn call(a: i64, b: i64, sequence: u64) -> Invocation {
	Invocation::new(SubstituteId::from_raw(1), ADD, vec![Value::Int(a), Value::Int(b)], sequence)
}

#[test]
fn pattern_requires_operation_arity_and_every_matcher() {
	let pattern = Pattern::from_args(ADD, args![1, any()]).unwrap();
	assert!(pattern.accepts_invocation(&call(1, 7, 0)));
	assert!(!pattern.accepts_invocation(&call(2, 7, 0)));

	let other = OperationId::new("add", 3);
	assert!(!pattern.accepts(&other, &[Value::Int(1), Value::Int(7), Value::Int(0)]));
	assert!(!pattern.accepts(&OperationId::new("sub", 2), &[Value::Int(1), Value::Int(7)]));
}

#[test]
fn pattern_rejects_wrong_matcher_count() {
	let err = Pattern::from_args(ADD, args![1]).unwrap_err();
	assert_eq!(err.found, 1);
	assert_eq!(err.to_string(), "pattern for add/2 has 1 matchers, expected 2");
}

#[test]
fn literal_patterns_never_act_as_wildcards() {
	let pattern = Pattern::from_literals(ADD, &[Value::Int(1), Value::Nil]).unwrap();
	assert!(!pattern.accepts_invocation(&call(1, 0, 0)));
	assert!(pattern.accepts(&ADD, &[Value::Int(1), Value::Nil]));
}

#[test]
fn rejected_positions_name_failing_matchers() {
	let pattern = Pattern::from_args(ADD, args![1, 2]).unwrap();
	assert_eq!(pattern.rejected_positions(&call(1, 3, 0)).unwrap().as_slice(), &[1]);
	assert_eq!(pattern.rejected_positions(&call(4, 3, 0)).unwrap().as_slice(), &[0, 1]);
	assert!(pattern.rejected_positions(&call(1, 2, 0)).unwrap().is_empty());

	let unrelated = Invocation::new(SubstituteId::from_raw(1), OperationId::new("reset", 0), Vec::new(), 0);
	assert!(pattern.rejected_positions(&unrelated).is_none());
}

#[test]
fn ledger_keeps_call_order_and_duplicates() {
	let mut ledger = Ledger::new();
	ledger.append(call(1, 2, 0));
	ledger.append(call(1, 2, 1));
	ledger.append(call(3, 4, 2));

	let sequences: Vec<u64> = ledger.iter().map(Invocation::sequence).collect();
	assert_eq!(sequences, vec![0, 1, 2]);

	let pattern = Pattern::from_literals(ADD, &[Value::Int(1), Value::Int(2)]).unwrap();
	assert_eq!(ledger.matching(&pattern).count(), 2);

	ledger.clear();
	assert!(ledger.is_empty());
	assert_eq!(ledger.matching(&pattern).count(), 0);
}

#[test]
fn displays() {
	assert_eq!(call(1, 2, 0).to_string(), "add(1, 2)");
	assert_eq!(Pattern::from_args(ADD, args![1, any()]).unwrap().to_string(), "add(1, any)");
}

proptest! {
	#[test]
	fn prop_ledger_counts_every_matching_call(calls in proptest::collection::vec((0i64..3, 0i64..3), 0..40)) {
		let mut ledger = Ledger::new();
		for (seq, (a, b)) in calls.iter().enumerate() {
			ledger.append(call(*a, *b, seq as u64));
		}
		let pattern = Pattern::from_literals(ADD, &[Value::Int(0), Value::Int(0)]).unwrap();
		let expected = calls.iter().filter(|(a, b)| *a == 0 && *b == 0).count();
		prop_assert_eq!(ledger.matching(&pattern).count(), expected);
		prop_assert_eq!(ledger.len(), calls.len());
	}
}
