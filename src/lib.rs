//! slcmd - command registration, parsing and dispatch.
//!
//! Hosts register named commands with a compact argument spec such as
//! `"i|s,u|g"`, then hand raw lines of user text to
//! [`Dispatcher::run`](handlers::Dispatcher::run). The engine resolves the
//! command, checks authority, tokenizes and validates the arguments and
//! invokes the bound executor, relaying the outcome to post-processing and
//! failure callbacks. Errors never escape `run`; they are routed to the
//! registry's error sink.
//!
//! ```
//! use std::rc::Rc;
//! use slcmd::handlers::{Dispatcher, Invoker};
//! use slcmd::Value;
//!
//! let dispatcher = Dispatcher::new(Rc::new(|id: i32| Some(Invoker::new(id, "player", 0))));
//! let give = dispatcher.create("give", "i|g").unwrap();
//! give.borrow_mut().bind_exec(|_, _, args| Ok(args.get(0).cloned().unwrap_or_default()));
//!
//! assert_eq!(dispatcher.run(1, "give 3 golden apples"), 3);
//! assert_eq!(dispatcher.run(1, "give none"), -1);
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod telemetry;

pub use error::{CallbackError, CommandError, ErrorKind, ListenerError};
pub use slcmd_proto::{ArgFlags, ArgType, CommandSpec, MAX_SLOTS, Value};
