use proptest::prelude::*;
use rstest::rstest;
use understudy::modes::{never, times};
use understudy::{CapabilitySet, MockContext, OperationId, Reply, ReturnKind, Substitute, Value, VerificationMode, Verified, VerifyError};

fn counter(ctx: &MockContext) -> Substitute {
	ctx.substitute(
		CapabilitySet::new("Counter")
			.method("bump", 1, ReturnKind::UInt)
			.optional_method("peek", 0, ReturnKind::UInt),
	)
}

fn bump(sub: &Substitute, by: u64) -> Reply {
	sub.invoke(OperationId::new("bump", 1), vec![Value::UInt(by)]).unwrap()
}

fn scale(sub: &Substitute, factor: f64) -> Reply {
	sub.invoke(OperationId::new("scale", 1), vec![Value::Float(factor)]).unwrap()
}

fn verify_bumps(ctx: &MockContext, sub: &Substitute, by: u64, mode: VerificationMode) -> Result<Verified, VerifyError> {
	ctx.try_verify(mode, || bump(sub, by))
}

#[rstest]
#[case(ReturnKind::UInt, Value::UInt(0))]
#[case(ReturnKind::Int, Value::Int(0))]
#[case(ReturnKind::Bool, Value::Bool(false))]
#[case(ReturnKind::Str, Value::string(""))]
#[case(ReturnKind::List, Value::list([]))]
#[case(ReturnKind::Nullable, Value::Nil)]
#[case(ReturnKind::Unit, Value::Nil)]
fn dynamic_calls_default_to_the_declared_kind(#[case] returns: ReturnKind, #[case] expected: Value) {
	let ctx = MockContext::new();
	let sub = ctx.substitute(CapabilitySet::new("Probe").method("probe", 0, returns));

	let reply = sub.invoke(OperationId::new("probe", 0), Vec::<Value>::new()).unwrap();

	assert_eq!(reply.value(), Some(&expected));
}

#[test]
fn union_keeps_members_of_both_sets() {
	let ctx = MockContext::new();
	let both = counter(&ctx).capabilities().clone().union(CapabilitySet::new("Reset").method("reset", 0, ReturnKind::Unit));
	let sub = ctx.substitute(both);

	assert_eq!(sub.capabilities().name(), "Counter + Reset");
	assert!(sub.invoke(OperationId::new("reset", 0), Vec::<Value>::new()).is_ok());
	assert!(sub.invoke(OperationId::new("peek", 0), Vec::<Value>::new()).is_ok());
	assert!(sub.capabilities().clone().without_optionals().get(&OperationId::new("peek", 0)).is_none());
}

proptest! {
	#[test]
	fn prop_exact_count_matches_calls(calls in 0usize..20, by in any::<u64>()) {
		let ctx = MockContext::new();
		let sub = counter(&ctx);
		for _ in 0..calls {
			bump(&sub, by);
		}

		let verified = verify_bumps(&ctx, &sub, by, times(calls)).unwrap();
		prop_assert_eq!(verified.count(), calls);
		let err = verify_bumps(&ctx, &sub, by, times(calls + 1)).unwrap_err();
		prop_assert_eq!(err.failure().map(|f| f.actual()), Some(calls));
		prop_assert!(!ctx.is_declaring());
	}

	#[test]
	fn prop_float_arguments_count_exactly(calls in 0usize..10, factor in any::<f64>()) {
		let ctx = MockContext::new();
		let sub = ctx.substitute(CapabilitySet::new("Scaler").method("scale", 1, ReturnKind::Unit));
		for _ in 0..calls {
			scale(&sub, factor);
		}

		let verified = ctx.try_verify(times(calls), || scale(&sub, factor)).unwrap();
		prop_assert_eq!(verified.count(), calls);
	}

	#[test]
	fn prop_other_arguments_never_count(calls in 1usize..10, by in 0u64..1000) {
		let ctx = MockContext::new();
		let sub = counter(&ctx);
		for _ in 0..calls {
			bump(&sub, by);
		}

		prop_assert!(verify_bumps(&ctx, &sub, by + 1, never()).is_ok());
	}

	#[test]
	fn prop_newest_stub_shadows_older(values in prop::collection::vec(any::<u64>(), 1..8)) {
		let ctx = MockContext::new();
		let sub = counter(&ctx);
		for value in &values {
			let stubbing = ctx.try_given(|| bump(&sub, 1)).unwrap();
			stubbing.try_respond(understudy::Response::ReturnValue(Value::UInt(*value))).unwrap();
		}

		let last = values.last().copied().map(Value::UInt);
		prop_assert_eq!(bump(&sub, 1).value().cloned(), last);
		prop_assert_eq!(sub.stub_count().unwrap(), values.len());
	}
}
