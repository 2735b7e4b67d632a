//! Unified error handling for slcmd.
//!
//! Every way a dispatch can go wrong is one named [`CommandError`] variant
//! carrying its contextual value. Registration and listener mutation
//! failures are [`ListenerError`]s returned directly to the caller, and
//! failures raised inside user callbacks are [`CallbackError`]s.

use std::any::Any;
use std::fmt;

use slcmd_proto::{ArgType, ParseError, SpecError};
use thiserror::Error;

// ============================================================================
// Dispatch Errors (reported to the error sink)
// ============================================================================

/// Errors that can occur while running a command line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("invalid or empty command name")]
    EmptyCommand { invoker: i32 },

    #[error("invalid command name: {reason}")]
    InvalidCommand { invoker: i32, reason: String },

    #[error("string argument not closed properly at argument {slot}")]
    SyntaxError { slot: usize },

    #[error("command buffer was exceeded unexpectedly at argument {slot} (limit {limit})")]
    BufferOverflow { slot: usize, limit: usize },

    #[error("unable to find the specified command: {name}")]
    UnknownCommand { name: String },

    #[error("no executer was specified for this command")]
    MissingExecuter { invoker: i32 },

    #[error("insufficient authority to execute command")]
    InsufficientAuth { invoker: i32 },

    #[error("incomplete command arguments: {given} given, {min} required")]
    IncompleteArgs { min: usize, given: usize },

    #[error("extraneous command arguments: more than {max} given")]
    ExtraneousArgs { max: usize, given: usize },

    #[error("unsupported command argument {slot}: {found} not accepted")]
    UnsupportedArg { slot: usize, found: ArgType },

    #[error("command execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("command execution aborted with result {result}")]
    ExecutionAborted { result: i64 },

    #[error("unable to complete command post processing: {message}")]
    PostProcessingFailed { message: String },

    #[error("unable to resolve command failure: {message}")]
    UnresolvedFailure { message: String },
}

impl CommandError {
    /// The kind of this error, without its contextual value.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyCommand { .. } => ErrorKind::EmptyCommand,
            Self::InvalidCommand { .. } => ErrorKind::InvalidCommand,
            Self::SyntaxError { .. } => ErrorKind::SyntaxError,
            Self::BufferOverflow { .. } => ErrorKind::BufferOverflow,
            Self::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            Self::MissingExecuter { .. } => ErrorKind::MissingExecuter,
            Self::InsufficientAuth { .. } => ErrorKind::InsufficientAuth,
            Self::IncompleteArgs { .. } => ErrorKind::IncompleteArgs,
            Self::ExtraneousArgs { .. } => ErrorKind::ExtraneousArgs,
            Self::UnsupportedArg { .. } => ErrorKind::UnsupportedArg,
            Self::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            Self::ExecutionAborted { .. } => ErrorKind::ExecutionAborted,
            Self::PostProcessingFailed { .. } => ErrorKind::PostProcessingFailed,
            Self::UnresolvedFailure { .. } => ErrorKind::UnresolvedFailure,
        }
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        self.kind().error_code()
    }

    /// Argument slot the error is attributed to, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::SyntaxError { slot }
            | Self::BufferOverflow { slot, .. }
            | Self::UnsupportedArg { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    /// Message captured from a failing callback, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailed { message }
            | Self::PostProcessingFailed { message }
            | Self::UnresolvedFailure { message } => Some(message),
            _ => None,
        }
    }
}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnterminatedString { slot } => Self::SyntaxError { slot },
            ParseError::BufferOverflow { slot, limit } => Self::BufferOverflow { slot, limit },
        }
    }
}

/// Discriminant of [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyCommand,
    InvalidCommand,
    SyntaxError,
    BufferOverflow,
    UnknownCommand,
    MissingExecuter,
    InsufficientAuth,
    IncompleteArgs,
    ExtraneousArgs,
    UnsupportedArg,
    ExecutionFailed,
    ExecutionAborted,
    PostProcessingFailed,
    UnresolvedFailure,
}

impl ErrorKind {
    /// Snake-case label used for metrics.
    pub fn error_code(self) -> &'static str {
        match self {
            Self::EmptyCommand => "empty_command",
            Self::InvalidCommand => "invalid_command",
            Self::SyntaxError => "syntax_error",
            Self::BufferOverflow => "buffer_overflow",
            Self::UnknownCommand => "unknown_command",
            Self::MissingExecuter => "missing_executer",
            Self::InsufficientAuth => "insufficient_auth",
            Self::IncompleteArgs => "incomplete_args",
            Self::ExtraneousArgs => "extraneous_args",
            Self::UnsupportedArg => "unsupported_arg",
            Self::ExecutionFailed => "execution_failed",
            Self::ExecutionAborted => "execution_aborted",
            Self::PostProcessingFailed => "post_processing_failed",
            Self::UnresolvedFailure => "unresolved_failure",
        }
    }

    /// Whether the failure happens before the handler is invoked.
    pub fn is_pre_invocation(self) -> bool {
        !matches!(
            self,
            Self::ExecutionFailed
                | Self::ExecutionAborted
                | Self::PostProcessingFailed
                | Self::UnresolvedFailure
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Listener Errors (registration and mutation)
// ============================================================================

/// Errors returned by listener construction, mutation and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("invalid command name: {0}")]
    InvalidName(String),

    #[error("command '{name}' already exists as '{existing}' for hash ({hash})")]
    Duplicate {
        name: String,
        existing: String,
        hash: u64,
    },

    #[error("command '{0}' is already attached")]
    AlreadyAttached(String),

    #[error("argument ({value}) is out of total range ({max})")]
    ArityOutOfRange { value: usize, max: usize },

    #[error("minimum argument ({min}) exceeds maximum ({max})")]
    MinExceedsMax { min: usize, max: usize },

    #[error("argument slot ({index}) is out of range ({max})")]
    SlotOutOfRange { index: usize, max: usize },

    #[error("invalid command spec: {0}")]
    Spec(#[from] SpecError),
}

// ============================================================================
// Callback Errors (raised by user-supplied callbacks)
// ============================================================================

/// Failure raised by an execute, authorize, post or fail callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    /// Convert a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        Self {
            message: format!("application panic occurred [{detail}]"),
        }
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
