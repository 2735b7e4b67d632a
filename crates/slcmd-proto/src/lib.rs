//! # slcmd-proto
//!
//! The text layer of the Straylight command engine: everything needed to turn
//! the argument part of a typed command line into typed values, without any
//! knowledge of registries, sessions or callbacks.
//!
//! ## Features
//!
//! - Compact per-command argument grammar (`"i|s,u|g"`) compiled into
//!   per-slot [`ArgFlags`]
//! - Deterministic usage-string rendering from compiled flags
//! - Left-to-right tokenizer with quoting, escaping, greedy capture and
//!   integer/float/boolean sniffing
//! - Reusable [`ScratchBuffer`] for staging extracted strings
//!
//! ## Quick Start
//!
//! ```rust
//! use slcmd_proto::{tokenize, CommandSpec, ScratchBuffer, Value};
//!
//! let spec: CommandSpec = "i|s,u|g".parse().expect("valid spec");
//! let mut scratch = ScratchBuffer::new();
//!
//! let tokens = tokenize("42 'red fox' jumps over", &spec, 3, &mut scratch).unwrap();
//! assert_eq!(tokens.args[0], Value::Integer(42));
//! assert_eq!(tokens.args[1], Value::from("RED FOX"));
//! assert_eq!(tokens.args[2], Value::from("jumps over"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod flags;
pub mod scratch;
pub mod spec;
pub mod tokenizer;
pub mod value;

pub use self::error::{BufferOverflow, ParseError, SpecError};
pub use self::flags::{ArgFlags, ArgType};
pub use self::scratch::ScratchBuffer;
pub use self::spec::CommandSpec;
pub use self::tokenizer::{tokenize, Tokenizer, Tokens};
pub use self::value::Value;

/// Maximum number of argument slots a single command can describe.
pub const MAX_SLOTS: usize = 16;
