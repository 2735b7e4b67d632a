//! Command handlers.
//!
//! [`core`] holds the engine: listeners, the registry, execution contexts
//! and the dispatcher. [`console`] provides the built-in commands attached
//! by the interactive host.

pub mod console;
pub mod core;

pub use console::{ConsoleState, Printer};
pub use self::core::{
    Arguments, Context, Dispatcher, Invoker, InvokerDirectory, Listener, ListenerBuilder,
    ListenerHandle, Outcome, Registry, SessionTable,
};
