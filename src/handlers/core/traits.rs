//! Callback traits for command listeners.
//!
//! A listener carries up to four callbacks, and the registry two fallbacks:
//!
//! - [`Executor`]: runs the command with its decoded [`Arguments`]
//! - [`Authorizer`]: decides whether an invoker may run a protected command
//! - [`PostProcessor`]: observes the result of a successful execution
//! - [`FailureHandler`]: observes an aborted or failed execution
//! - [`ErrorSink`]: registry-wide receiver of every [`CommandError`]
//!
//! Every trait is implemented for matching closures, so most callers bind
//! plain closures through the `bind_*` methods. Callbacks receive the
//! [`Dispatcher`] they were invoked from and may run further commands on it.

use std::collections::HashMap;
use std::rc::Rc;

use slcmd_proto::Value;

use super::dispatch::Dispatcher;
use super::invoker::Invoker;
use crate::error::{CallbackError, CommandError};

/// Result type for user callbacks.
pub type CallbackResult<T> = Result<T, CallbackError>;

/// Runs a command.
///
/// A falsy or zero result aborts the command; an error fails it.
pub trait Executor {
    fn execute(&self, cx: &Dispatcher, invoker: &Invoker, args: &Arguments)
    -> CallbackResult<Value>;
}

impl<F> Executor for F
where
    F: Fn(&Dispatcher, &Invoker, &Arguments) -> CallbackResult<Value>,
{
    fn execute(
        &self,
        cx: &Dispatcher,
        invoker: &Invoker,
        args: &Arguments,
    ) -> CallbackResult<Value> {
        self(cx, invoker, args)
    }
}

/// Grants or denies access to a protected command. Errors deny.
pub trait Authorizer {
    fn authorize(&self, cx: &Dispatcher, invoker: &Invoker) -> CallbackResult<bool>;
}

impl<F> Authorizer for F
where
    F: Fn(&Dispatcher, &Invoker) -> CallbackResult<bool>,
{
    fn authorize(&self, cx: &Dispatcher, invoker: &Invoker) -> CallbackResult<bool> {
        self(cx, invoker)
    }
}

/// Observes the result of a successful execution.
pub trait PostProcessor {
    fn post(&self, cx: &Dispatcher, invoker: &Invoker, result: &Value) -> CallbackResult<()>;
}

impl<F> PostProcessor for F
where
    F: Fn(&Dispatcher, &Invoker, &Value) -> CallbackResult<()>,
{
    fn post(&self, cx: &Dispatcher, invoker: &Invoker, result: &Value) -> CallbackResult<()> {
        self(cx, invoker, result)
    }
}

/// Observes an aborted or failed execution.
pub trait FailureHandler {
    fn fail(&self, cx: &Dispatcher, invoker: &Invoker, error: &CommandError)
    -> CallbackResult<()>;
}

impl<F> FailureHandler for F
where
    F: Fn(&Dispatcher, &Invoker, &CommandError) -> CallbackResult<()>,
{
    fn fail(
        &self,
        cx: &Dispatcher,
        invoker: &Invoker,
        error: &CommandError,
    ) -> CallbackResult<()> {
        self(cx, invoker, error)
    }
}

/// Registry-wide receiver of dispatch errors.
pub trait ErrorSink {
    fn report(&self, cx: &Dispatcher, error: &CommandError);
}

impl<F> ErrorSink for F
where
    F: Fn(&Dispatcher, &CommandError),
{
    fn report(&self, cx: &Dispatcher, error: &CommandError) {
        self(cx, error)
    }
}

pub type ExecutorRef = Rc<dyn Executor>;
pub type AuthorizerRef = Rc<dyn Authorizer>;
pub type PostProcessorRef = Rc<dyn PostProcessor>;
pub type FailureHandlerRef = Rc<dyn FailureHandler>;
pub type ErrorSinkRef = Rc<dyn ErrorSink>;

// ============================================================================
// Arguments
// ============================================================================

/// Key of an argument in associative mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    /// The slot's tag name.
    Tag(String),
    /// The slot index, for untagged slots.
    Index(usize),
}

/// Decoded arguments as handed to an [`Executor`].
///
/// The listener's associative flag selects the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<Value>),
    Associative(HashMap<ArgKey, Value>),
}

impl Arguments {
    /// Build the associative shape, keying each value by its tag or index.
    pub fn associative<S: AsRef<str>>(values: Vec<Value>, tags: &[S]) -> Self {
        let map = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let key = match tags.get(idx).map(AsRef::as_ref) {
                    Some(tag) if !tag.is_empty() => ArgKey::Tag(tag.to_owned()),
                    _ => ArgKey::Index(idx),
                };
                (key, value)
            })
            .collect();
        Self::Associative(map)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(v) => v.len(),
            Self::Associative(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_associative(&self) -> bool {
        matches!(self, Self::Associative(_))
    }

    /// Positional value, or the associative value keyed by index.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        match self {
            Self::Positional(v) => v.get(idx),
            Self::Associative(m) => m.get(&ArgKey::Index(idx)),
        }
    }

    /// Associative value keyed by tag.
    pub fn by_tag(&self, tag: &str) -> Option<&Value> {
        match self {
            Self::Positional(_) => None,
            Self::Associative(m) => m.get(&ArgKey::Tag(tag.to_owned())),
        }
    }

    /// String argument at `idx`, if present and a string.
    pub fn str(&self, idx: usize) -> Option<&str> {
        self.get(idx).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associative_keys() {
        let args = Arguments::associative(
            vec![Value::Integer(1), Value::from("x"), Value::Boolean(true)],
            &["id", "", "flag"],
        );
        assert!(args.is_associative());
        assert_eq!(args.by_tag("id"), Some(&Value::Integer(1)));
        assert_eq!(args.get(1), Some(&Value::from("x")));
        assert_eq!(args.by_tag("flag"), Some(&Value::Boolean(true)));
        assert_eq!(args.get(0), None);
    }

    #[test]
    fn test_associative_without_tags_uses_indices() {
        let args = Arguments::associative::<&str>(vec![Value::Integer(5)], &[]);
        assert_eq!(args.get(0), Some(&Value::Integer(5)));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_positional_access() {
        let args = Arguments::Positional(vec![Value::from("a"), Value::Float(1.5)]);
        assert_eq!(args.str(0), Some("a"));
        assert_eq!(args.str(1), None);
        assert_eq!(args.by_tag("a"), None);
        assert!(!args.is_empty());
    }
}
