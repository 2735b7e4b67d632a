//! Core command infrastructure.
//!
//! This module contains the fundamental types of the command engine:
//! listeners and their builder, the registry that owns them, the
//! per-invocation context and its guard, and the dispatcher that runs a
//! line of text against all of it.
//!
//! ## Dispatch stages
//!
//! `New → AuthChecked → Parsed → ArityChecked → TypeChecked → Invoked →
//! {Succeeded | Aborted | Failed} → PostProcessed → Done`
//!
//! Pre-invocation failures end the dispatch immediately with code `-1`.
//! Executor results are relayed as an [`Outcome`]: success to the
//! post-processor, abort and failure to the failure handler.

pub mod context;
pub mod dispatch;
pub mod invoker;
pub mod listener;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use context::{Context, ContextGuard, CurrentContext, Stage};
pub use dispatch::{Dispatcher, Outcome};
pub use invoker::{Invoker, InvokerDirectory, SessionTable};
pub use listener::{Listener, ListenerBuilder, ListenerHandle, validate_name};
pub use registry::{NameHash, Registry, default_name_hash};
pub use traits::{
    ArgKey, Arguments, Authorizer, CallbackResult, ErrorSink, Executor, FailureHandler,
    PostProcessor,
};
