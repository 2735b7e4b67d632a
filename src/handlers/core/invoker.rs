//! Invoker resolution.
//!
//! The dispatcher only knows invokers by id. Hosts supply an
//! [`InvokerDirectory`] that turns an id into the session data callbacks see.

use std::cell::RefCell;
use std::collections::HashMap;

/// The session a command runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoker {
    pub id: i32,
    pub name: String,
    /// Compared against a listener's authority level.
    pub authority: i32,
}

impl Invoker {
    pub fn new(id: i32, name: impl Into<String>, authority: i32) -> Self {
        Self {
            id,
            name: name.into(),
            authority,
        }
    }

    /// Placeholder for an id the directory does not know.
    ///
    /// Its authority is below every non-negative level.
    pub fn unresolved(id: i32) -> Self {
        Self {
            id,
            name: String::new(),
            authority: -1,
        }
    }
}

/// Resolves invoker ids to sessions.
pub trait InvokerDirectory {
    fn resolve(&self, id: i32) -> Option<Invoker>;
}

impl<F> InvokerDirectory for F
where
    F: Fn(i32) -> Option<Invoker>,
{
    fn resolve(&self, id: i32) -> Option<Invoker> {
        self(id)
    }
}

/// In-memory session table.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: RefCell<HashMap<i32, Invoker>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session, returning the previous one.
    pub fn insert(&self, invoker: Invoker) -> Option<Invoker> {
        self.sessions.borrow_mut().insert(invoker.id, invoker)
    }

    pub fn remove(&self, id: i32) -> Option<Invoker> {
        self.sessions.borrow_mut().remove(&id)
    }

    /// Change a session's authority. Returns false if the id is unknown.
    pub fn set_authority(&self, id: i32, authority: i32) -> bool {
        match self.sessions.borrow_mut().get_mut(&id) {
            Some(session) => {
                session.authority = authority;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }
}

impl InvokerDirectory for SessionTable {
    fn resolve(&self, id: i32) -> Option<Invoker> {
        self.sessions.borrow().get(&id).cloned()
    }
}
