//! Command listeners.
//!
//! A [`Listener`] is everything the dispatcher knows about one named
//! command: its compiled argument spec, tags, arity bounds, authority rule
//! and callback bindings. Listeners live behind a shared [`ListenerHandle`]
//! so the registry and the host can both hold them; a detached listener can
//! still be inspected and edited, it just cannot be invoked.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use slcmd_proto::{ArgFlags, ArgType, CommandSpec, MAX_SLOTS, Value};

use super::dispatch::Dispatcher;
use super::invoker::Invoker;
use super::traits::{
    Arguments, AuthorizerRef, CallbackResult, ExecutorRef, FailureHandlerRef, PostProcessorRef,
};
use crate::error::{CommandError, ListenerError};

/// Shared handle to a listener.
pub type ListenerHandle = Rc<RefCell<Listener>>;

/// Why a command name is unusable, if it is.
pub(crate) fn name_violation(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is empty")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else if name.chars().any(char::is_control) {
        Some("name contains control characters")
    } else {
        None
    }
}

/// Check that `name` can be registered as a command.
pub fn validate_name(name: &str) -> Result<(), ListenerError> {
    match name_violation(name) {
        Some(reason) => Err(ListenerError::InvalidName(format!("'{name}': {reason}"))),
        None => Ok(()),
    }
}

fn check_arity(min_args: usize, max_args: usize) -> Result<(), ListenerError> {
    for value in [min_args, max_args] {
        if value > MAX_SLOTS {
            return Err(ListenerError::ArityOutOfRange {
                value,
                max: MAX_SLOTS,
            });
        }
    }
    if min_args > max_args {
        return Err(ListenerError::MinExceedsMax {
            min: min_args,
            max: max_args,
        });
    }
    Ok(())
}

/// One named command.
pub struct Listener {
    name: String,
    spec: CommandSpec,
    tags: Vec<String>,
    min_args: usize,
    max_args: usize,
    help: String,
    info: String,
    authority: i32,
    protected: bool,
    suspended: bool,
    associative: bool,
    on_exec: Option<ExecutorRef>,
    on_auth: Option<AuthorizerRef>,
    on_post: Option<PostProcessorRef>,
    on_fail: Option<FailureHandlerRef>,
}

impl Listener {
    /// Create a listener with an empty spec and full arity range.
    pub fn new(name: impl Into<String>) -> Result<Self, ListenerError> {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> ListenerBuilder {
        ListenerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Only the registry renames, so that attachment stays consistent.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    // ------------------------------------------------------------------------
    // Spec and usage
    // ------------------------------------------------------------------------

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    /// Compile and install a new spec.
    ///
    /// On failure the previous spec stays in place. On success the info
    /// text is regenerated.
    pub fn set_spec(&mut self, source: &str) -> Result<(), ListenerError> {
        self.spec = CommandSpec::compile(source)?;
        self.generate_info(false);
        Ok(())
    }

    /// Flags of the slot at `index`.
    pub fn arg_flags(&self, index: usize) -> Result<ArgFlags, ListenerError> {
        if index >= MAX_SLOTS {
            return Err(ListenerError::SlotOutOfRange {
                index,
                max: MAX_SLOTS,
            });
        }
        Ok(self.spec.slot(index))
    }

    /// Whether the slot at `index` accepts `ty`. Slots past the end accept anything.
    pub fn arg_check(&self, index: usize, ty: ArgType) -> bool {
        self.spec.slot(index).accepts(ty)
    }

    /// Render the usage string into the info text and return it.
    pub fn generate_info(&mut self, full: bool) -> &str {
        self.info = self
            .spec
            .usage(&self.tags, self.min_args, self.max_args, full);
        &self.info
    }

    // ------------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------------

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replace all tags. An empty list clears them.
    pub fn set_tags<S: Into<String>>(
        &mut self,
        tags: impl IntoIterator<Item = S>,
    ) -> Result<(), ListenerError> {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.len() > MAX_SLOTS {
            return Err(ListenerError::SlotOutOfRange {
                index: tags.len() - 1,
                max: MAX_SLOTS,
            });
        }
        self.tags = tags;
        self.generate_info(false);
        Ok(())
    }

    /// Tag of slot `index`; empty if the slot is untagged.
    pub fn tag(&self, index: usize) -> Result<&str, ListenerError> {
        if index >= MAX_SLOTS {
            return Err(ListenerError::SlotOutOfRange {
                index,
                max: MAX_SLOTS,
            });
        }
        Ok(self.tags.get(index).map_or("", String::as_str))
    }

    pub fn set_tag(&mut self, index: usize, tag: impl Into<String>) -> Result<(), ListenerError> {
        if index >= MAX_SLOTS {
            return Err(ListenerError::SlotOutOfRange {
                index,
                max: MAX_SLOTS,
            });
        }
        if self.tags.len() <= index {
            self.tags.resize(index + 1, String::new());
        }
        self.tags[index] = tag.into();
        self.generate_info(false);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Arity
    // ------------------------------------------------------------------------

    pub fn min_args(&self) -> usize {
        self.min_args
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    pub fn set_min_args(&mut self, min_args: usize) -> Result<(), ListenerError> {
        self.set_arity(min_args, self.max_args)
    }

    pub fn set_max_args(&mut self, max_args: usize) -> Result<(), ListenerError> {
        self.set_arity(self.min_args, max_args)
    }

    /// Set both bounds at once. The old bounds stay on error.
    pub fn set_arity(&mut self, min_args: usize, max_args: usize) -> Result<(), ListenerError> {
        check_arity(min_args, max_args)?;
        self.min_args = min_args;
        self.max_args = max_args;
        self.generate_info(false);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Text and flags
    // ------------------------------------------------------------------------

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn set_help(&mut self, help: impl Into<String>) {
        self.help = help.into();
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    /// Required authority level. Negative disables the default check.
    pub fn authority(&self) -> i32 {
        self.authority
    }

    pub fn set_authority(&mut self, authority: i32) {
        self.authority = authority;
    }

    /// Whether any authority check runs at all.
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Whether the executor receives tag-keyed arguments.
    pub fn is_associative(&self) -> bool {
        self.associative
    }

    pub fn set_associative(&mut self, associative: bool) {
        self.associative = associative;
    }

    // ------------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------------

    pub fn bind_exec<F>(&mut self, f: F)
    where
        F: Fn(&Dispatcher, &Invoker, &Arguments) -> CallbackResult<Value> + 'static,
    {
        self.on_exec = Some(Rc::new(f));
    }

    pub fn bind_auth<F>(&mut self, f: F)
    where
        F: Fn(&Dispatcher, &Invoker) -> CallbackResult<bool> + 'static,
    {
        self.on_auth = Some(Rc::new(f));
    }

    pub fn bind_post<F>(&mut self, f: F)
    where
        F: Fn(&Dispatcher, &Invoker, &Value) -> CallbackResult<()> + 'static,
    {
        self.on_post = Some(Rc::new(f));
    }

    pub fn bind_fail<F>(&mut self, f: F)
    where
        F: Fn(&Dispatcher, &Invoker, &CommandError) -> CallbackResult<()> + 'static,
    {
        self.on_fail = Some(Rc::new(f));
    }

    pub fn on_exec(&self) -> Option<ExecutorRef> {
        self.on_exec.clone()
    }

    pub fn set_exec(&mut self, exec: Option<ExecutorRef>) {
        self.on_exec = exec;
    }

    pub fn on_auth(&self) -> Option<AuthorizerRef> {
        self.on_auth.clone()
    }

    pub fn set_auth(&mut self, auth: Option<AuthorizerRef>) {
        self.on_auth = auth;
    }

    pub fn on_post(&self) -> Option<PostProcessorRef> {
        self.on_post.clone()
    }

    pub fn set_post(&mut self, post: Option<PostProcessorRef>) {
        self.on_post = post;
    }

    pub fn on_fail(&self) -> Option<FailureHandlerRef> {
        self.on_fail.clone()
    }

    pub fn set_fail(&mut self, fail: Option<FailureHandlerRef>) {
        self.on_fail = fail;
    }

    pub fn into_handle(self) -> ListenerHandle {
        Rc::new(RefCell::new(self))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("name", &self.name)
            .field("spec", &self.spec.as_str())
            .field("tags", &self.tags)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("authority", &self.authority)
            .field("protected", &self.protected)
            .field("suspended", &self.suspended)
            .field("associative", &self.associative)
            .field("on_exec", &self.on_exec.is_some())
            .field("on_auth", &self.on_auth.is_some())
            .field("on_post", &self.on_post.is_some())
            .field("on_fail", &self.on_fail.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Listener`].
///
/// Validation happens once in [`ListenerBuilder::build`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ListenerBuilder {
    name: String,
    spec: String,
    tags: Vec<String>,
    min_args: usize,
    max_args: usize,
    authority: i32,
    protected: bool,
    associative: bool,
    help: String,
}

impl ListenerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: String::new(),
            tags: Vec::new(),
            min_args: 0,
            max_args: MAX_SLOTS,
            authority: -1,
            protected: false,
            associative: false,
            help: String::new(),
        }
    }

    pub fn spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = spec.into();
        self
    }

    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn arity(mut self, min_args: usize, max_args: usize) -> Self {
        self.min_args = min_args;
        self.max_args = max_args;
        self
    }

    pub fn authority(mut self, authority: i32) -> Self {
        self.authority = authority;
        self
    }

    pub fn protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub fn associative(mut self, associative: bool) -> Self {
        self.associative = associative;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn build(self) -> Result<Listener, ListenerError> {
        validate_name(&self.name)?;
        check_arity(self.min_args, self.max_args)?;
        let spec = CommandSpec::compile(&self.spec)?;

        let mut listener = Listener {
            name: self.name,
            spec,
            tags: Vec::new(),
            min_args: self.min_args,
            max_args: self.max_args,
            help: self.help,
            info: String::new(),
            authority: self.authority,
            protected: self.protected,
            suspended: false,
            associative: self.associative,
            on_exec: None,
            on_auth: None,
            on_post: None,
            on_fail: None,
        };
        listener.set_tags(self.tags)?;
        Ok(listener)
    }
}
