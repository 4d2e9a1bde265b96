//! Shared test utilities.

#![allow(dead_code)]

use argtable::args::{ArgRegistry, HandlerError, ReusePolicy};
use parking_lot::Mutex;
use std::sync::Arc;

/// Every handler call, in order: (tag, value).
pub type CallLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// Registry from the reference scenario: -arg1 (Forbidden),
/// -arg2 (AllowedUpTo 5), -arg3 (Forbidden). Handlers only record calls.
pub fn scenario_registry() -> (ArgRegistry, CallLog) {
    recording_registry(&[
        ("-arg1", ReusePolicy::Forbidden),
        ("-arg2", ReusePolicy::AllowedUpTo(5)),
        ("-arg3", ReusePolicy::Forbidden),
    ])
}

/// Registry whose handlers record their calls and always succeed.
pub fn recording_registry(table: &[(&str, ReusePolicy)]) -> (ArgRegistry, CallLog) {
    let log = CallLog::default();
    let mut builder = ArgRegistry::builder();
    for &(tag, policy) in table {
        let log = log.clone();
        let name = tag.to_string();
        builder = builder.arg(tag, policy, move |value| {
            log.lock().push((name.clone(), value.map(String::from)));
            Ok(())
        });
    }
    (builder.build().expect("valid registry"), log)
}

/// Handler that records the call and then fails with `code`.
pub fn failing_handler(
    log: CallLog,
    tag: &'static str,
    code: i32,
) -> impl Fn(Option<&str>) -> Result<(), HandlerError> + Send + Sync + 'static {
    move |value: Option<&str>| -> Result<(), HandlerError> {
        log.lock().push((tag.to_string(), value.map(String::from)));
        Err(HandlerError::Code(code))
    }
}

pub fn calls(log: &CallLog) -> Vec<(String, Option<String>)> {
    log.lock().clone()
}

pub fn call(tag: &str, value: Option<&str>) -> (String, Option<String>) {
    (tag.to_string(), value.map(String::from))
}
