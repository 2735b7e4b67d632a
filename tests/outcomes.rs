//! Integration tests for outcome relaying: abort, failure and post-processing.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{ALICE, Harness};
use slcmd::handlers::core::{Dispatcher, Invoker, Outcome};
use slcmd::{CallbackError, CommandError, ErrorKind, Value};

#[test]
fn test_zero_result_aborts_and_calls_fail_handler() {
    let h = Harness::new();
    let listener = h.dispatcher.create("zero", "").unwrap();
    let failures = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&failures);
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Ok(Value::Integer(0)));
        l.bind_fail(move |_, invoker, err| {
            seen.borrow_mut().push((invoker.id, err.clone()));
            Ok(())
        });
    }

    assert_eq!(h.dispatcher.dispatch(ALICE, "zero"), Outcome::Aborted);
    assert_eq!(h.dispatcher.run(ALICE, "zero"), 0);
    assert_eq!(
        *failures.borrow(),
        vec![
            (ALICE, CommandError::ExecutionAborted { result: 0 }),
            (ALICE, CommandError::ExecutionAborted { result: 0 }),
        ]
    );
    assert_eq!(
        h.kinds(),
        vec![ErrorKind::ExecutionAborted, ErrorKind::ExecutionAborted]
    );
}

#[test]
fn test_error_fails_with_captured_message() {
    let h = Harness::new();
    let listener = h.dispatcher.create("boom", "").unwrap();
    let messages = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&messages);
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Err(CallbackError::new("target is out of range")));
        l.bind_fail(move |_, _, err| {
            seen.borrow_mut()
                .push(err.message().unwrap_or_default().to_owned());
            Ok(())
        });
    }

    assert_eq!(h.dispatcher.run(ALICE, "boom"), -1);
    assert_eq!(*messages.borrow(), vec!["target is out of range"]);
    assert_eq!(
        h.last_error(),
        Some(CommandError::ExecutionFailed {
            message: "target is out of range".into()
        })
    );
}

#[test]
fn test_panicking_handler_is_contained() {
    let h = Harness::new();
    let listener = h.dispatcher.create("panic", "").unwrap();
    listener
        .borrow_mut()
        .bind_exec(|_, _, _| panic!("handler exploded"));

    assert_eq!(h.dispatcher.run(ALICE, "panic"), -1);
    assert_eq!(
        h.last_error(),
        Some(CommandError::ExecutionFailed {
            message: "application panic occurred [handler exploded]".into()
        })
    );
    assert!(!h.dispatcher.is_context());
}

#[test]
fn test_failing_fail_handler_is_unresolved() {
    let h = Harness::new();
    let listener = h.dispatcher.create("worse", "").unwrap();
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Err("first".into()));
        l.bind_fail(|_, _, _| Err("second".into()));
    }

    assert_eq!(h.dispatcher.run(ALICE, "worse"), -1);
    assert_eq!(
        h.kinds(),
        vec![ErrorKind::ExecutionFailed, ErrorKind::UnresolvedFailure]
    );
    assert_eq!(
        h.last_error().and_then(|e| e.message().map(str::to_owned)),
        Some("second".to_string())
    );
}

#[test]
fn test_post_handler_runs_once_with_result() {
    let h = Harness::new();
    let listener = h.dispatcher.create("ok", "").unwrap();
    let posted = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&posted);
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Ok(Value::Integer(12)));
        l.bind_post(move |_, _, result| {
            seen.borrow_mut().push(result.clone());
            Ok(())
        });
    }

    assert_eq!(h.dispatcher.run(ALICE, "ok"), 12);
    assert_eq!(*posted.borrow(), vec![Value::Integer(12)]);
    assert!(h.errors.borrow().is_empty());
}

#[test]
fn test_post_handler_error_keeps_result() {
    let h = Harness::new();
    let listener = h.dispatcher.create("ok", "").unwrap();
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Ok(Value::Integer(3)));
        l.bind_post(|_, _, _| panic!("post exploded"));
    }

    assert_eq!(h.dispatcher.run(ALICE, "ok"), 3);
    assert_eq!(h.kinds(), vec![ErrorKind::PostProcessingFailed]);
}

#[test]
fn test_fail_handler_not_called_on_success() {
    let h = Harness::new();
    let listener = h.dispatcher.create("fine", "").unwrap();
    let called = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&called);
    {
        let mut l = listener.borrow_mut();
        l.bind_exec(|_, _, _| Ok(Value::from("done")));
        l.bind_fail(move |_, _, _| {
            *flag.borrow_mut() = true;
            Ok(())
        });
    }
    assert_eq!(h.dispatcher.run(ALICE, "fine"), 1);
    assert!(!*called.borrow());
}

#[test]
fn test_panicking_error_sink_is_contained() {
    let h = Harness::new();
    h.dispatcher.bind_error(|_, _| panic!("sink exploded"));
    assert_eq!(h.dispatcher.run(ALICE, "missing"), -1);
}

fn broken_directory() -> Dispatcher {
    Dispatcher::new(Rc::new(|_: i32| -> Option<Invoker> { panic!("lookup failed") }))
}

#[test]
fn test_panicking_invoker_lookup_is_contained() {
    let dispatcher = broken_directory();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    dispatcher.bind_error(move |_, err| sink.borrow_mut().push(err.clone()));
    let listener = dispatcher.create("look", "").unwrap();
    listener.borrow_mut().bind_exec(|_, _, _| Ok(Value::Integer(1)));

    assert_eq!(dispatcher.run(ALICE, "look"), -1);
    assert_eq!(
        *errors.borrow(),
        vec![CommandError::ExecutionFailed {
            message: "application panic occurred [lookup failed]".into()
        }]
    );
    assert!(!dispatcher.is_context());
}

#[test]
fn test_panicking_invoker_lookup_denies_authorize() {
    let dispatcher = broken_directory();
    let listener = dispatcher.create("guarded", "").unwrap();
    assert!(dispatcher.authorize(&listener, ALICE));
    listener.borrow_mut().set_protected(true);
    assert!(!dispatcher.authorize(&listener, ALICE));
    assert!(dispatcher.resolve(ALICE).is_err());
}
