//! Per-invocation execution context.
//!
//! Every call to [`Dispatcher::run`](super::dispatch::Dispatcher::run) gets a
//! fresh [`Context`] holding the invoker, the split command line, the
//! resolved listener and the parsed arguments. The dispatcher tracks the
//! one currently executing in a [`CurrentContext`] slot, entered through a
//! [`ContextGuard`] that restores the previous context on drop.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use slcmd_proto::{ScratchBuffer, Value};

use super::listener::ListenerHandle;

/// How far a dispatch has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    New,
    AuthChecked,
    Parsed,
    ArityChecked,
    TypeChecked,
    Invoked,
    Succeeded,
    Aborted,
    Failed,
    PostProcessed,
    Done,
}

/// Transient state of one command invocation.
#[derive(Debug)]
pub struct Context {
    invoker: i32,
    command: String,
    argument: String,
    listener: RefCell<Option<ListenerHandle>>,
    args: RefCell<Vec<Value>>,
    scratch: RefCell<ScratchBuffer>,
    stage: Cell<Stage>,
}

impl Context {
    pub fn new(invoker: i32, command: impl Into<String>, argument: impl Into<String>) -> Self {
        let argument = argument.into();
        let scratch = ScratchBuffer::with_capacity(argument.len());
        Self {
            invoker,
            command: command.into(),
            argument,
            listener: RefCell::new(None),
            args: RefCell::new(Vec::new()),
            scratch: RefCell::new(scratch),
            stage: Cell::new(Stage::New),
        }
    }

    pub fn invoker(&self) -> i32 {
        self.invoker
    }

    /// Command name as typed.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Argument text as typed, trimmed.
    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn listener(&self) -> Option<ListenerHandle> {
        self.listener.borrow().clone()
    }

    pub(crate) fn set_listener(&self, listener: ListenerHandle) {
        *self.listener.borrow_mut() = Some(listener);
    }

    /// Arguments parsed so far.
    pub fn args(&self) -> Ref<'_, Vec<Value>> {
        self.args.borrow()
    }

    pub(crate) fn set_args(&self, args: Vec<Value>) {
        *self.args.borrow_mut() = args;
    }

    pub(crate) fn scratch(&self) -> &RefCell<ScratchBuffer> {
        &self.scratch
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    pub(crate) fn advance(&self, stage: Stage) {
        self.stage.set(stage);
    }

    /// Drop parsed state. Called when the invocation ends.
    pub(crate) fn release(&self) {
        self.scratch.borrow_mut().clear();
        self.advance(Stage::Done);
    }
}

/// Slot holding the context currently executing.
#[derive(Debug, Default)]
pub struct CurrentContext {
    slot: RefCell<Option<Rc<Context>>>,
}

impl CurrentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Rc<Context>> {
        self.slot.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Make `cx` current until the returned guard drops.
    pub fn enter(&self, cx: Rc<Context>) -> ContextGuard<'_> {
        let previous = self.slot.replace(Some(Rc::clone(&cx)));
        ContextGuard {
            owner: self,
            context: cx,
            previous,
        }
    }
}

/// Restores the previous context on drop.
///
/// Restoring only happens if the guard's own context is still current, so
/// a guard dropped out of order leaves a newer context alone.
#[must_use = "the context is left as soon as the guard drops"]
pub struct ContextGuard<'a> {
    owner: &'a CurrentContext,
    context: Rc<Context>,
    previous: Option<Rc<Context>>,
}

impl ContextGuard<'_> {
    pub fn context(&self) -> &Rc<Context> {
        &self.context
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.release();
        let mut slot = self.owner.slot.borrow_mut();
        let is_current = slot
            .as_ref()
            .is_some_and(|cur| Rc::ptr_eq(cur, &self.context));
        if is_current {
            *slot = self.previous.take();
        }
    }
}
