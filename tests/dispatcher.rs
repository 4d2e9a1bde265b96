//! Integration tests for validate-then-dispatch.

mod common;

use argtable::args::{
    exit_code, ArgRegistry, DispatchError, Dispatcher, RelationEntry, ReusePolicy,
    EXIT_MISUSE, EXIT_UNKNOWN,
};
use common::{call, calls, failing_handler, recording_registry, scenario_registry, CallLog};

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn valid_input_dispatches_in_order() {
    let (registry, log) = scenario_registry();
    let outcome = Dispatcher::new(&registry).dispatch(&["-arg1", "-arg2=x", "-arg2=y"]);

    assert!(outcome.is_ok());
    assert_eq!(exit_code(&outcome), 0);
    assert_eq!(
        calls(&log),
        vec![
            call("-arg1", None),
            call("-arg2", Some("x")),
            call("-arg2", Some("y")),
        ]
    );
}

#[test]
fn forbidden_repeat_is_misuse() {
    let (registry, log) = scenario_registry();
    let outcome = Dispatcher::new(&registry).dispatch(&["-arg1", "-arg1"]);

    match &outcome {
        Err(DispatchError::Misuse { tags }) => assert_eq!(tags, &vec!["-arg1".to_string()]),
        other => panic!("expected misuse, got {:?}", other),
    }
    assert_eq!(exit_code(&outcome), EXIT_MISUSE);
    assert!(calls(&log).is_empty());
}

#[test]
fn unknown_argument_is_reported() {
    let (registry, log) = scenario_registry();
    let outcome = Dispatcher::new(&registry).dispatch(&["-bogus"]);

    match &outcome {
        Err(DispatchError::UnknownArgument { tokens }) => {
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].token, "-bogus");
            assert_eq!(tokens[0].position, 0);
        }
        other => panic!("expected unknown argument, got {:?}", other),
    }
    assert_eq!(exit_code(&outcome), EXIT_UNKNOWN);
    assert!(calls(&log).is_empty());
}

#[test]
fn empty_input_succeeds_without_work() {
    let (registry, log) = scenario_registry();
    assert!(Dispatcher::new(&registry).dispatch::<String>(&[]).is_ok());
    assert!(calls(&log).is_empty());
}

// =============================================================================
// NO PARTIAL EFFECTS
// =============================================================================

#[test]
fn unknown_anywhere_blocks_every_handler() {
    let (registry, log) = scenario_registry();
    let err = Dispatcher::new(&registry)
        .dispatch(&["-arg1", "-arg2=ok", "-arg3", "-nope"])
        .unwrap_err();

    assert!(err.is_side_effect_free());
    assert!(calls(&log).is_empty());
}

#[test]
fn unknown_takes_precedence_over_misuse() {
    let (registry, log) = scenario_registry();
    let err = Dispatcher::new(&registry)
        .dispatch(&["-arg1", "-arg1", "-x"])
        .unwrap_err();

    assert!(matches!(err, DispatchError::UnknownArgument { .. }));
    assert!(calls(&log).is_empty());
}

#[test]
fn every_unknown_token_is_reported() {
    let (registry, _) = scenario_registry();
    let err = Dispatcher::new(&registry)
        .dispatch(&["-a", "-arg1", "-arg1xyz", "plain"])
        .unwrap_err();

    let DispatchError::UnknownArgument { tokens } = err else {
        panic!("expected unknown argument");
    };
    let reported: Vec<(usize, &str)> = tokens
        .iter()
        .map(|t| (t.position, t.token.as_str()))
        .collect();
    assert_eq!(reported, vec![(0, "-a"), (2, "-arg1xyz"), (3, "plain")]);
}

#[test]
fn every_misused_descriptor_is_reported_in_declaration_order() {
    let (registry, log) = scenario_registry();
    let err = Dispatcher::new(&registry)
        .dispatch(&["-arg3", "-arg1", "-arg3", "-arg1", "-arg3"])
        .unwrap_err();

    let DispatchError::Misuse { tags } = err else {
        panic!("expected misuse");
    };
    assert_eq!(tags, vec!["-arg1", "-arg3"]);
    assert!(calls(&log).is_empty());
}

// =============================================================================
// REUSE BOUNDARIES
// =============================================================================

#[test]
fn allowed_up_to_boundary() {
    let (registry, log) = recording_registry(&[("-v", ReusePolicy::AllowedUpTo(3))]);
    let dispatcher = Dispatcher::new(&registry);

    assert!(dispatcher.dispatch(&["-v", "-v=2", "-v"]).is_ok());
    assert_eq!(calls(&log).len(), 3);

    log.lock().clear();
    let err = dispatcher.dispatch(&["-v", "-v", "-v", "-v"]).unwrap_err();
    assert!(matches!(err, DispatchError::Misuse { .. }));
    assert!(calls(&log).is_empty());
}

#[test]
fn forbidden_boundary() {
    let (registry, log) = recording_registry(&[("-once", ReusePolicy::Forbidden)]);
    let dispatcher = Dispatcher::new(&registry);

    assert!(dispatcher.dispatch(&["-once"]).is_ok());
    assert_eq!(calls(&log), vec![call("-once", None)]);

    assert!(matches!(
        dispatcher.dispatch(&["-once", "-once=again"]),
        Err(DispatchError::Misuse { .. })
    ));
}

#[test]
fn usage_counts_do_not_leak_between_calls() {
    let (registry, log) = scenario_registry();
    let dispatcher = Dispatcher::new(&registry);

    for _ in 0..3 {
        assert!(dispatcher.dispatch(&["-arg1"]).is_ok());
    }
    assert_eq!(calls(&log).len(), 3);
}

// =============================================================================
// SWITCH VS VALUE
// =============================================================================

#[test]
fn switch_and_value_forms() {
    let (registry, log) = scenario_registry();
    Dispatcher::new(&registry)
        .dispatch(&["-arg2", "-arg2=hello", "-arg2=", "-arg2=a=b"])
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            call("-arg2", None),
            call("-arg2", Some("hello")),
            call("-arg2", Some("")),
            call("-arg2", Some("a=b")),
        ]
    );
}

#[test]
fn order_follows_input_not_declaration() {
    let (registry, log) = scenario_registry();
    Dispatcher::new(&registry)
        .dispatch(&["-arg3", "-arg2=z", "-arg1"])
        .unwrap();

    let tags: Vec<String> = calls(&log).into_iter().map(|(t, _)| t).collect();
    assert_eq!(tags, vec!["-arg3", "-arg2", "-arg1"]);
}

#[test]
fn non_ascii_values_pass_through() {
    let (registry, log) = scenario_registry();
    Dispatcher::new(&registry).dispatch(&["-arg2=héllo wörld"]).unwrap();
    assert_eq!(calls(&log), vec![call("-arg2", Some("héllo wörld"))]);
}

// =============================================================================
// VALIDATION ONLY
// =============================================================================

#[test]
fn validation_is_idempotent_and_side_effect_free() {
    let (registry, log) = scenario_registry();
    let dispatcher = Dispatcher::new(&registry);
    let input = ["-arg2=a", "-arg1", "-arg2=b"];

    let first = dispatcher.validate(&input).unwrap();
    let second = dispatcher.validate(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.entries(),
        &[
            RelationEntry::Matched(1),
            RelationEntry::Matched(0),
            RelationEntry::Matched(1),
        ]
    );

    let bad = ["-arg1", "-arg1"];
    let a = dispatcher.validate(&bad).unwrap_err();
    let b = dispatcher.validate(&bad).unwrap_err();
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(a.code(), b.code());

    assert!(calls(&log).is_empty());
}

// =============================================================================
// HANDLER FAILURE
// =============================================================================

#[test]
fn handler_failure_stops_dispatch_without_rollback() {
    let log = CallLog::default();
    let ok_log = log.clone();
    let registry = ArgRegistry::builder()
        .arg("-first", ReusePolicy::Forbidden, move |v| {
            ok_log.lock().push(("-first".into(), v.map(String::from)));
            Ok(())
        })
        .arg("-boom", ReusePolicy::Forbidden, failing_handler(log.clone(), "-boom", -9))
        .arg("-last", ReusePolicy::Forbidden, failing_handler(log.clone(), "-last", -1))
        .build()
        .unwrap();

    let outcome = Dispatcher::new(&registry).dispatch(&["-first", "-boom=1", "-last"]);

    match &outcome {
        Err(DispatchError::HandlerFailure { index, tag, .. }) => {
            assert_eq!(*index, 1);
            assert_eq!(tag, "-boom");
        }
        other => panic!("expected handler failure, got {:?}", other),
    }
    assert_eq!(exit_code(&outcome), -65);
    // -first stays committed, -last never ran
    assert_eq!(calls(&log), vec![call("-first", None), call("-boom", Some("1"))]);
}

#[test]
fn handler_error_is_preserved_as_source() {
    use std::error::Error;

    let log = CallLog::default();
    let registry = ArgRegistry::builder()
        .arg("-boom", ReusePolicy::Forbidden, failing_handler(log, "-boom", -42))
        .build()
        .unwrap();

    let err = Dispatcher::new(&registry).dispatch(&["-boom"]).unwrap_err();
    let source = err.source().expect("handler error as source");
    assert_eq!(source.to_string(), "handler failed with code -42");
}

// =============================================================================
// TOKEN LIMIT
// =============================================================================

#[test]
fn token_limit_blocks_dispatch() {
    let (registry, log) = scenario_registry();
    let dispatcher = Dispatcher::new(&registry).with_max_tokens(Some(2));

    let err = dispatcher.dispatch(&["-arg1", "-arg2=a", "-arg3"]).unwrap_err();
    assert!(matches!(err, DispatchError::TooManyArguments { given: 3, max: 2 }));
    assert!(calls(&log).is_empty());

    assert!(dispatcher.dispatch(&["-arg1", "-arg3"]).is_ok());
}
