//! Command line dispatch.
//!
//! [`Dispatcher::run`] takes one line of user text, resolves the command,
//! checks authority, tokenizes the arguments, validates them against the
//! listener's spec and invokes the bound executor. Every failure is routed
//! to the registry's error sink; nothing escapes `run`, including panics
//! raised inside callbacks.
//!
//! Callbacks receive the dispatcher itself and may run further commands.
//! No registry or listener borrow is held while a callback runs.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use slcmd_proto::{Tokens, Value, tokenize};
use tracing::{debug, trace, warn};

use super::context::{Context, CurrentContext, Stage};
use super::invoker::{Invoker, InvokerDirectory};
use super::listener::{Listener, ListenerBuilder, ListenerHandle, name_violation, validate_name};
use super::registry::Registry;
use super::traits::{Arguments, CallbackResult};
use crate::config::EngineConfig;
use crate::error::{CallbackError, CommandError, ListenerError};
use crate::telemetry::{CommandTimer, spans};

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The executor returned a truthy value; carries its integer code.
    Succeeded(i64),
    /// The executor returned a falsy value.
    Aborted,
    /// Dispatch stopped on an error, which was also sent to the error sink.
    Failed(CommandError),
}

impl Outcome {
    /// Integer code handed back to the host.
    ///
    /// Success yields the executor's code, an abort yields 0 and every
    /// failure yields -1.
    pub fn code(&self) -> i32 {
        match self {
            Self::Succeeded(code) => (*code).clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            Self::Aborted => 0,
            Self::Failed(_) => -1,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn error(&self) -> Option<&CommandError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Run a user callback, converting a panic into a [`CallbackError`].
fn guarded<T>(f: impl FnOnce() -> CallbackResult<T>) -> CallbackResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(CallbackError::from_panic(payload)))
}

/// Integer code of an executor result, or `None` if it aborts.
fn result_code(value: &Value) -> Option<i64> {
    if !value.is_truthy() {
        return None;
    }
    match value.as_integer() {
        Some(code) if code != 0 => Some(code),
        _ => Some(1),
    }
}

/// Split a command line into name and argument text.
fn split_line(line: &str) -> (&str, &str) {
    let line = line.trim_matches(|c: char| c.is_ascii_whitespace());
    match line.find(|c: char| c.is_ascii_whitespace()) {
        Some(idx) => {
            let (command, rest) = line.split_at(idx);
            (command, rest.trim_start_matches(|c: char| c.is_ascii_whitespace()))
        }
        None => (line, ""),
    }
}

/// Owns the registry and runs command lines against it.
pub struct Dispatcher {
    registry: RefCell<Registry>,
    directory: Rc<dyn InvokerDirectory>,
    current: CurrentContext,
    config: EngineConfig,
}

impl Dispatcher {
    pub fn new(directory: Rc<dyn InvokerDirectory>) -> Self {
        Self::with_config(directory, EngineConfig::default())
    }

    pub fn with_config(directory: Rc<dyn InvokerDirectory>, config: EngineConfig) -> Self {
        Self::from_parts(directory, Registry::new(), config)
    }

    pub fn from_parts(
        directory: Rc<dyn InvokerDirectory>,
        registry: Registry,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry: RefCell::new(registry),
            directory,
            current: CurrentContext::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Start a listener with the configured defaults.
    pub fn builder(&self, name: impl Into<String>) -> ListenerBuilder {
        Listener::builder(name)
            .arity(0, self.config.max_args)
            .authority(self.config.default_authority)
    }

    /// Create and attach a listener.
    pub fn create(&self, name: &str, spec: &str) -> Result<ListenerHandle, ListenerError> {
        self.create_with(self.builder(name).spec(spec))
    }

    /// Build and attach a listener.
    pub fn create_with(&self, builder: ListenerBuilder) -> Result<ListenerHandle, ListenerError> {
        let handle = builder.build()?.into_handle();
        self.attach(&handle)?;
        Ok(handle)
    }

    pub fn attach(&self, listener: &ListenerHandle) -> Result<(), ListenerError> {
        self.registry.borrow_mut().attach(listener)?;
        debug!(command = %listener.borrow().name(), "Command attached");
        Ok(())
    }

    pub fn detach(&self, listener: &ListenerHandle) -> bool {
        self.registry.borrow_mut().detach(listener)
    }

    pub fn detach_name(&self, name: &str) -> Option<ListenerHandle> {
        self.registry.borrow_mut().detach_name(name)
    }

    pub fn is_attached(&self, listener: &ListenerHandle) -> bool {
        self.registry.borrow().is_attached(listener)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.borrow().contains(name)
    }

    /// Look up an attached listener. The name is validated first.
    pub fn find_by_name(&self, name: &str) -> Result<Option<ListenerHandle>, ListenerError> {
        validate_name(name)?;
        Ok(self.registry.borrow().find_by_name(name))
    }

    pub fn rename(&self, listener: &ListenerHandle, name: &str) -> Result<(), ListenerError> {
        self.registry.borrow_mut().rename(listener, name)
    }

    pub fn sort(&self) {
        self.registry.borrow_mut().sort();
    }

    pub fn count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn names(&self) -> Vec<String> {
        self.registry.borrow().names()
    }

    pub fn listeners(&self) -> Vec<ListenerHandle> {
        self.registry.borrow().listeners()
    }

    pub fn command_stats(&self) -> Vec<(String, u64)> {
        self.registry.borrow().command_stats()
    }

    /// Bind the registry-wide authorizer.
    pub fn bind_auth<F>(&self, f: F)
    where
        F: Fn(&Dispatcher, &Invoker) -> CallbackResult<bool> + 'static,
    {
        self.registry.borrow_mut().set_on_auth(Some(Rc::new(f)));
    }

    pub fn clear_auth(&self) {
        self.registry.borrow_mut().set_on_auth(None);
    }

    /// Bind the error sink that receives every dispatch error.
    pub fn bind_error<F>(&self, f: F)
    where
        F: Fn(&Dispatcher, &CommandError) + 'static,
    {
        self.registry.borrow_mut().set_on_error(Some(Rc::new(f)));
    }

    pub fn clear_error(&self) {
        self.registry.borrow_mut().set_on_error(None);
    }

    /// Detach all listeners and drop the global callbacks.
    pub fn clear(&self) {
        self.registry.borrow_mut().clear();
    }

    // ========================================================================
    // Context queries
    // ========================================================================

    /// Whether a command is currently executing.
    pub fn is_context(&self) -> bool {
        self.current.is_active()
    }

    /// The innermost command currently executing.
    pub fn current(&self) -> Option<Rc<Context>> {
        self.current.get()
    }

    /// Resolve an invoker id, falling back to an unprivileged placeholder.
    ///
    /// A panic in the directory is returned as an error.
    pub fn resolve(&self, id: i32) -> CallbackResult<Invoker> {
        guarded(|| {
            Ok(self
                .directory
                .resolve(id)
                .unwrap_or_else(|| Invoker::unresolved(id)))
        })
    }

    /// Whether `invoker` may run the listener.
    ///
    /// Unprotected listeners admit everyone. A failed invoker lookup denies.
    pub fn authorize(&self, listener: &ListenerHandle, invoker: i32) -> bool {
        if !listener.borrow().is_protected() {
            return true;
        }
        match self.resolve(invoker) {
            Ok(invoker) => self.check_authority(listener, &invoker),
            Err(err) => {
                debug!(invoker, error = %err, "Invoker lookup failed, denying");
                false
            }
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run a command line and return its integer code.
    pub fn run(&self, invoker: i32, line: &str) -> i32 {
        self.dispatch(invoker, line).code()
    }

    /// Run a command line and return the full outcome.
    pub fn dispatch(&self, invoker: i32, line: &str) -> Outcome {
        let (command, argument) = split_line(line);
        let _span = spans::command(command, invoker).entered();
        trace!(argument = %argument, "Dispatching command");

        let cx = Rc::new(Context::new(invoker, command, argument));
        let guard = self.current.enter(Rc::clone(&cx));
        let outcome = self.execute(&cx);
        drop(guard);
        outcome
    }

    fn execute(&self, cx: &Context) -> Outcome {
        if cx.command().is_empty() {
            return self.fail(cx, CommandError::EmptyCommand {
                invoker: cx.invoker(),
            });
        }
        if let Some(reason) = name_violation(cx.command()) {
            return self.fail(cx, CommandError::InvalidCommand {
                invoker: cx.invoker(),
                reason: reason.to_owned(),
            });
        }

        let lookup = self.registry.borrow().find_by_name(cx.command());
        let Some(listener) = lookup else {
            return self.fail(cx, CommandError::UnknownCommand {
                name: cx.command().to_owned(),
            });
        };
        cx.set_listener(Rc::clone(&listener));
        self.registry.borrow().record_use(cx.command());
        let _timer = CommandTimer::new(cx.command());

        let invoker = match self.resolve(cx.invoker()) {
            Ok(invoker) => invoker,
            Err(err) => {
                return self.fail(cx, CommandError::ExecutionFailed {
                    message: err.message,
                });
            }
        };

        let protected = listener.borrow().is_protected();
        if protected && !self.check_authority(&listener, &invoker) {
            return self.fail(cx, CommandError::InsufficientAuth {
                invoker: cx.invoker(),
            });
        }
        cx.advance(Stage::AuthChecked);

        let exec = listener.borrow().on_exec();
        let Some(exec) = exec else {
            return self.fail(cx, CommandError::MissingExecuter {
                invoker: cx.invoker(),
            });
        };

        let parsed = self.parse(cx, &listener.borrow());
        let tokens = match parsed {
            Ok(tokens) => tokens,
            Err(err) => return self.fail(cx, err),
        };
        cx.advance(Stage::Parsed);

        let arity = Self::check_arity(&listener.borrow(), &tokens);
        if let Err(err) = arity {
            return self.fail(cx, err);
        }
        cx.advance(Stage::ArityChecked);

        let types = Self::check_types(&listener.borrow(), &tokens);
        if let Err(err) = types {
            return self.fail(cx, err);
        }
        cx.advance(Stage::TypeChecked);

        let arguments = {
            let listener = listener.borrow();
            if listener.is_associative() {
                Arguments::associative(tokens.args.clone(), listener.tags())
            } else {
                Arguments::Positional(tokens.args.clone())
            }
        };
        cx.set_args(tokens.args);

        cx.advance(Stage::Invoked);
        let result = guarded(|| exec.execute(self, &invoker, &arguments));

        match result {
            Err(err) => {
                cx.advance(Stage::Failed);
                let error = CommandError::ExecutionFailed {
                    message: err.message,
                };
                self.report(&error);
                self.relay_failure(&listener, &invoker, &error);
                Outcome::Failed(error)
            }
            Ok(value) => match result_code(&value) {
                None => {
                    cx.advance(Stage::Aborted);
                    let error = CommandError::ExecutionAborted {
                        result: value.as_integer().unwrap_or(0),
                    };
                    self.report(&error);
                    self.relay_failure(&listener, &invoker, &error);
                    Outcome::Aborted
                }
                Some(code) => {
                    cx.advance(Stage::Succeeded);
                    let post = listener.borrow().on_post();
                    if let Some(post) = post {
                        if let Err(err) = guarded(|| post.post(self, &invoker, &value)) {
                            self.report(&CommandError::PostProcessingFailed {
                                message: err.message,
                            });
                        }
                        cx.advance(Stage::PostProcessed);
                    }
                    Outcome::Succeeded(code)
                }
            },
        }
    }

    fn parse(&self, cx: &Context, listener: &Listener) -> Result<Tokens, CommandError> {
        if cx.argument().is_empty() {
            return Ok(Tokens::default());
        }
        let mut scratch = cx.scratch().borrow_mut();
        Ok(tokenize(
            cx.argument(),
            listener.spec(),
            listener.max_args(),
            &mut scratch,
        )?)
    }

    /// A truncated parse counts one extra argument.
    fn check_arity(listener: &Listener, tokens: &Tokens) -> Result<(), CommandError> {
        let given = tokens.len() + usize::from(tokens.truncated);
        if given < listener.min_args() {
            return Err(CommandError::IncompleteArgs {
                min: listener.min_args(),
                given,
            });
        }
        if given > listener.max_args() {
            return Err(CommandError::ExtraneousArgs {
                max: listener.max_args(),
                given,
            });
        }
        Ok(())
    }

    fn check_types(listener: &Listener, tokens: &Tokens) -> Result<(), CommandError> {
        for (slot, value) in tokens.args.iter().enumerate() {
            if let Some(found) = value.arg_type() {
                if !listener.spec().slot(slot).accepts(found) {
                    return Err(CommandError::UnsupportedArg { slot, found });
                }
            }
        }
        Ok(())
    }

    /// Three-tier authority resolution.
    fn check_authority(&self, listener: &ListenerHandle, invoker: &Invoker) -> bool {
        let local = listener.borrow().on_auth();
        let auth = match local {
            Some(auth) => Some(auth),
            None => self.registry.borrow().on_auth(),
        };

        if let Some(auth) = auth {
            return match guarded(|| auth.authorize(self, invoker)) {
                Ok(allowed) => allowed,
                Err(err) => {
                    debug!(invoker = invoker.id, error = %err, "Authorizer failed, denying");
                    false
                }
            };
        }

        let level = listener.borrow().authority();
        level < 0 || invoker.authority >= level
    }

    fn relay_failure(&self, listener: &ListenerHandle, invoker: &Invoker, error: &CommandError) {
        let fail = listener.borrow().on_fail();
        if let Some(fail) = fail {
            if let Err(err) = guarded(|| fail.fail(self, invoker, error)) {
                self.report(&CommandError::UnresolvedFailure {
                    message: err.message,
                });
            }
        }
    }

    fn fail(&self, cx: &Context, error: CommandError) -> Outcome {
        cx.advance(Stage::Failed);
        self.report(&error);
        Outcome::Failed(error)
    }

    /// Route an error to metrics, logs and the error sink.
    fn report(&self, error: &CommandError) {
        let command = self
            .current()
            .map(|cx| cx.command().to_owned())
            .unwrap_or_default();
        crate::metrics::record_command_error(&command, error.error_code());
        debug!(command = %command, error_code = error.error_code(), error = %error, "Command error");

        let sink = self.registry.borrow().on_error();
        match sink {
            Some(sink) => {
                let reported = guarded(|| {
                    sink.report(self, error);
                    Ok(())
                });
                if let Err(err) = reported {
                    warn!(command = %command, error = %err, "Error sink failed");
                }
            }
            None => warn!(
                command = %command,
                error_code = error.error_code(),
                error = %error,
                "Unhandled command error"
            ),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.names())
            .field("is_context", &self.is_context())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
