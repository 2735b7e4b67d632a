//! Integration test common infrastructure.
//!
//! Provides a dispatcher wired to an in-memory session table and an error
//! sink that records every reported error.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use slcmd::handlers::core::{Arguments, Dispatcher, Invoker, ListenerHandle, SessionTable};
use slcmd::{CommandError, ErrorKind, Value};

/// Regular user, authority 0.
pub const ALICE: i32 = 1;
/// Privileged user, authority 5.
pub const ADMIN: i32 = 2;
/// Id the session table does not know.
pub const STRANGER: i32 = 99;

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub sessions: Rc<SessionTable>,
    pub errors: Rc<RefCell<Vec<CommandError>>>,
}

impl Harness {
    pub fn new() -> Self {
        let sessions = Rc::new(SessionTable::new());
        sessions.insert(Invoker::new(ALICE, "alice", 0));
        sessions.insert(Invoker::new(ADMIN, "admin", 5));

        let dispatcher = Dispatcher::new(sessions.clone());
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        dispatcher.bind_error(move |_, err| sink.borrow_mut().push(err.clone()));

        Self {
            dispatcher,
            sessions,
            errors,
        }
    }

    /// Kinds of every error reported so far.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors.borrow().iter().map(CommandError::kind).collect()
    }

    pub fn last_error(&self) -> Option<CommandError> {
        self.errors.borrow().last().cloned()
    }

    pub fn clear_errors(&self) {
        self.errors.borrow_mut().clear();
    }

    /// Attach a command whose executor records its arguments and returns 1.
    pub fn recorder(&self, name: &str, spec: &str) -> (ListenerHandle, Rc<RefCell<Vec<Arguments>>>) {
        let listener = self.dispatcher.create(name, spec).expect("create listener");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&calls);
        listener.borrow_mut().bind_exec(move |_, _, args| {
            seen.borrow_mut().push(args.clone());
            Ok(Value::Integer(1))
        });
        (listener, calls)
    }

    /// Run `line` against a fresh recorder using `spec`, returning the positional values.
    pub fn parse(&self, spec: &str, line: &str) -> Option<Vec<Value>> {
        let (listener, calls) = self.recorder("parsed", spec);
        self.dispatcher.run(ALICE, &format!("parsed {line}"));
        self.dispatcher.detach(&listener);
        let calls = calls.borrow();
        match calls.first() {
            Some(Arguments::Positional(values)) => Some(values.clone()),
            _ => None,
        }
    }
}
