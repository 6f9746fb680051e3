use std::panic::{AssertUnwindSafe, catch_unwind};

use pretty_assertions::assert_eq;
use understudy_invocation::Invocation;
use understudy_primitives::ReturnKind;
use understudy_registry::Response;
use understudy_verify::{once, times};

use super::*;
use crate::handle::Reply;
use crate::report::CollectingReporter;

fn calculator(ctx: &MockContext) -> Substitute {
	ctx.substitute(
		CapabilitySet::new("Calculator")
			.method("add", 2, ReturnKind::Int)
			.method("reset", 0, ReturnKind::Unit),
	)
}

fn add() -> OperationId {
	OperationId::new("add", 2)
}

fn ints(a: i64, b: i64) -> Vec<Value> {
	vec![Value::Int(a), Value::Int(b)]
}

fn returned(reply: Result<Reply>) -> Value {
	match reply {
		Ok(Reply::Returned(value)) => value,
		other => panic!("expected a returned value, got {other:?}"),
	}
}

#[test]
fn low_level_stub_answers_live_calls() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	ctx.begin_stubbing(Some(&calc)).unwrap();
	assert_eq!(returned(calc.invoke(add(), ints(1, 2))), Value::Int(0));
	ctx.finish_stubbing().unwrap().will_return(99);

	assert_eq!(returned(calc.invoke(add(), ints(1, 2))), Value::Int(99));
	assert_eq!(returned(calc.invoke(add(), ints(2, 1))), Value::Int(0));
	assert_eq!(calc.invocations().unwrap().len(), 2);
	assert!(!ctx.is_declaring());
}

#[test]
fn second_declaration_start_is_rejected() {
	let ctx = MockContext::new();

	ctx.begin_stubbing(None).unwrap();
	let err = ctx.begin_verification(None).unwrap_err();

	assert!(matches!(
		err,
		EngineError::DeclarationPending {
			pending: DeclarationKind::Stub
		}
	));
	assert!(!ctx.is_declaring());
}

#[test]
fn finishing_without_a_call_is_rejected() {
	let ctx = MockContext::new();

	ctx.begin_stubbing(None).unwrap();
	let err = ctx.finish_stubbing().unwrap_err();

	assert!(matches!(err, EngineError::MissingTemplateCall { kind: DeclarationKind::Stub }));
	assert!(!ctx.is_declaring());
}

#[test]
fn second_template_call_fails_at_the_call() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	ctx.begin_verification(None).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	let err = calc.invoke(add(), ints(3, 4)).unwrap_err();

	assert!(matches!(
		err,
		EngineError::ExtraTemplateCall {
			kind: DeclarationKind::Verification,
			..
		}
	));
	assert!(matches!(ctx.finish_verification().unwrap_err(), EngineError::ExtraTemplateCall { .. }));
	assert!(matches!(ctx.finish_verification().unwrap_err(), EngineError::NotDeclaring));
	assert!(calc.invocations().unwrap().is_empty());
}

#[test]
fn template_call_on_another_substitute_is_rejected() {
	let ctx = MockContext::new();
	let first = calculator(&ctx);
	let second = calculator(&ctx);

	ctx.begin_stubbing(Some(&first)).unwrap();
	let err = second.invoke(add(), ints(1, 2)).unwrap_err();

	match err {
		EngineError::WrongTarget { expected, found, .. } => {
			assert_eq!(expected, first.id());
			assert_eq!(found, second.id());
		}
		other => panic!("unexpected error: {other}"),
	}
	assert!(!ctx.is_declaring());
	assert!(matches!(ctx.finish_stubbing().unwrap_err(), EngineError::WrongTarget { .. }));
}

#[test]
fn finishing_the_other_kind_is_rejected() {
	let ctx = MockContext::new();

	assert!(matches!(ctx.finish_stubbing().unwrap_err(), EngineError::NotDeclaring));

	ctx.begin_stubbing(None).unwrap();
	assert!(matches!(
		ctx.finish_verification().unwrap_err(),
		EngineError::DeclarationPending {
			pending: DeclarationKind::Stub
		}
	));
}

#[test]
fn substitutes_are_bound_to_their_context() {
	let ctx = MockContext::new();
	let other = MockContext::new();
	let calc = calculator(&ctx);

	assert!(matches!(other.begin_stubbing(Some(&calc)).unwrap_err(), EngineError::ForeignContext { .. }));
	assert!(matches!(other.stop_mocking(&calc).unwrap_err(), EngineError::ForeignContext { .. }));
	assert!(!calc.is_disposed());
}

#[test]
fn reset_abandons_a_pending_declaration() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	ctx.begin_stubbing(None).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	ctx.reset();

	assert!(!ctx.is_declaring());
	assert_eq!(returned(calc.invoke(add(), ints(1, 2))), Value::Int(0));
	assert_eq!(calc.stub_count().unwrap(), 0);
}

#[test]
fn verification_template_is_not_recorded() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);
	calc.invoke(add(), ints(1, 2)).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();

	ctx.begin_verification(Some(&calc)).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	let declared = ctx.finish_verification().unwrap();
	let verified = ctx.verify_pattern(declared.substitute(), &declared.pattern().unwrap(), times(2)).unwrap();

	assert_eq!(verified.count(), 2);
	assert_eq!(calc.invocations().unwrap().len(), 2);
}

#[test]
fn unknown_operation_is_rejected() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	let err = calc.invoke(OperationId::new("add", 3), ints(1, 2)).unwrap_err();

	assert!(matches!(err, EngineError::UnknownOperation { .. }));
	assert!(calc.invocations().unwrap().is_empty());
}

#[test]
fn disposed_substitute_fails_fast() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);
	calc.invoke(add(), ints(1, 2)).unwrap();

	ctx.stop_mocking(&calc).unwrap();

	assert!(calc.is_disposed());
	assert!(matches!(calc.invoke(add(), ints(1, 2)).unwrap_err(), EngineError::Disposed { .. }));
	assert!(matches!(ctx.begin_stubbing(Some(&calc)).unwrap_err(), EngineError::Disposed { .. }));
	assert!(matches!(calc.invocations().unwrap_err(), EngineError::Disposed { .. }));

	calc.dispose();
	assert!(calc.is_disposed());
}

#[test]
fn disposed_template_call_abandons_the_declaration() {
	let ctx = MockContext::new();
	let gone = calculator(&ctx);
	let calc = calculator(&ctx);
	gone.dispose();

	ctx.begin_stubbing(None).unwrap();
	assert!(matches!(gone.invoke(add(), ints(1, 2)).unwrap_err(), EngineError::Disposed { .. }));
	assert!(!ctx.is_declaring());

	assert_eq!(returned(calc.invoke(add(), ints(1, 2))), Value::Int(0));
	assert_eq!(calc.invocations().unwrap().len(), 1);
	assert!(matches!(ctx.finish_stubbing().unwrap_err(), EngineError::Disposed { substitute } if substitute == gone.id()));
	assert_eq!(calc.stub_count().unwrap(), 0);
}

#[test]
fn unknown_template_call_abandons_the_declaration() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	ctx.begin_verification(Some(&calc)).unwrap();
	assert!(calc.invoke(OperationId::new("add", 3), ints(1, 2)).is_err());
	assert!(!ctx.is_declaring());

	calc.invoke(add(), ints(1, 2)).unwrap();
	assert_eq!(calc.invocations().unwrap().len(), 1);
	assert!(matches!(ctx.finish_verification().unwrap_err(), EngineError::UnknownOperation { .. }));
	assert!(ctx.begin_stubbing(None).is_ok());
}

#[test]
fn closure_declarations_report_the_template_failure() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);
	calc.dispose();

	let stubbed = ctx.try_given(|| calc.invoke(add(), ints(1, 2))).err();
	assert!(matches!(stubbed, Some(EngineError::Disposed { .. })));

	let verified = ctx.try_verify(once(), || calc.invoke(OperationId::new("sub", 2), ints(1, 2))).unwrap_err();
	assert!(matches!(verified, VerifyError::Engine(EngineError::Disposed { .. })));
	assert!(!ctx.is_declaring());
}

#[test]
fn disposing_from_its_own_stub_releases_records() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);

	ctx.begin_stubbing(Some(&calc)).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	let inner = calc.clone();
	ctx.finish_stubbing().unwrap().will_do(move |_| inner.dispose());

	calc.invoke(add(), ints(1, 2)).unwrap();

	assert!(calc.is_disposed());
	assert_eq!(Arc::strong_count(&calc.shared), 1);
	assert!(matches!(calc.invoke(add(), ints(1, 2)).unwrap_err(), EngineError::Disposed { .. }));
}

#[test]
fn sequence_numbers_span_substitutes() {
	let ctx = MockContext::new();
	let first = calculator(&ctx);
	let second = calculator(&ctx);

	first.invoke(add(), ints(1, 1)).unwrap();
	second.invoke(add(), ints(2, 2)).unwrap();
	first.invoke(add(), ints(3, 3)).unwrap();

	let sequences = |sub: &Substitute| sub.invocations().unwrap().iter().map(Invocation::sequence).collect::<Vec<_>>();
	assert_eq!(sequences(&first), vec![0, 2]);
	assert_eq!(sequences(&second), vec![1]);
}

#[test]
fn panicking_declaration_returns_to_idle() {
	let ctx = MockContext::new();

	let result = catch_unwind(AssertUnwindSafe(|| {
		ctx.given(|| -> i64 { panic!("declaration closure failed") });
	}));

	assert!(result.is_err());
	assert!(!ctx.is_declaring());
}

#[test]
fn stub_closure_calling_its_own_substitute_is_reentrant() {
	let ctx = MockContext::new();
	let calc = calculator(&ctx);
	let seen = Arc::new(Mutex::new(None));

	ctx.begin_stubbing(Some(&calc)).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	let inner = calc.clone();
	let slot = Arc::clone(&seen);
	ctx.finish_stubbing().unwrap().will_do(move |_| {
		*slot.lock() = inner.invoke(OperationId::new("reset", 0), Vec::<Value>::new()).err();
	});

	calc.invoke(add(), ints(1, 2)).unwrap();

	assert!(matches!(*seen.lock(), Some(EngineError::Reentrant { .. })));
	assert_eq!(calc.invocations().unwrap().len(), 1);
}

#[test]
fn near_misses_are_capped_by_config() {
	let reporter = CollectingReporter::new();
	let ctx = MockContext::with_reporter(EngineConfig::new().with_near_miss_limit(1), reporter.clone());
	let calc = calculator(&ctx);
	for b in 0..3 {
		calc.invoke(add(), ints(5, b)).unwrap();
	}

	ctx.begin_verification(None).unwrap();
	calc.invoke(add(), ints(5, 9)).unwrap();
	let declared = ctx.finish_verification().unwrap();
	let err = ctx.verify_pattern(&calc, &declared.pattern().unwrap(), once()).unwrap_err();

	let failure = err.failure().unwrap();
	assert_eq!(failure.actual(), 0);
	assert_eq!(failure.near_misses().len(), 1);
	assert!(reporter.is_empty());
}

#[test]
fn strict_return_kinds_reject_mistyped_stubs() {
	let strict = MockContext::new();
	let calc = calculator(&strict);
	strict.begin_stubbing(None).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	let err = strict.finish_stubbing().unwrap().try_respond(Response::ReturnValue(Value::string("x"))).unwrap_err();
	assert!(matches!(err, EngineError::ReturnKindMismatch { expected: ReturnKind::Int, .. }));

	let lenient = MockContext::with_config(EngineConfig::new().with_strict_return_kinds(false));
	let calc = calculator(&lenient);
	lenient.begin_stubbing(None).unwrap();
	calc.invoke(add(), ints(1, 2)).unwrap();
	lenient.finish_stubbing().unwrap().will_return("x");
	assert_eq!(returned(calc.invoke(add(), ints(1, 2))), Value::string("x"));
}
