//! Built-in console commands.
//!
//! The console host attaches these to its dispatcher. Output goes through
//! a [`Printer`] so tests can capture it.

use std::cell::Cell;
use std::rc::Rc;

use slcmd_proto::Value;

use super::core::{Arguments, CallbackResult, Dispatcher, Invoker};
use crate::error::{CallbackError, ListenerError};

/// Line sink for command output.
pub type Printer = Rc<dyn Fn(&str)>;

/// Upper bound on `repeat` iterations.
pub const MAX_REPEAT: i64 = 64;

/// Shared console state.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    quit: Rc<Cell<bool>>,
}

impl ConsoleState {
    /// Whether `quit` has run.
    pub fn should_quit(&self) -> bool {
        self.quit.get()
    }
}

/// Attach the built-in commands and an error sink that prints failures.
pub fn install(dispatcher: &Dispatcher, out: Printer) -> Result<ConsoleState, ListenerError> {
    let state = ConsoleState::default();

    let print = Rc::clone(&out);
    dispatcher.bind_error(move |_, err| print(&format!("error [{}]: {}", err.kind(), err)));

    let help = dispatcher.create_with(
        dispatcher
            .builder("help")
            .spec("l")
            .tags(["command"])
            .arity(0, 1)
            .help("List commands, or show the usage of one."),
    )?;
    let print = Rc::clone(&out);
    help.borrow_mut()
        .bind_exec(move |cx, _, args| help_command(cx, &print, args));

    let stats = dispatcher.create_with(
        dispatcher
            .builder("stats")
            .arity(0, 0)
            .help("Show how often each command ran."),
    )?;
    let print = Rc::clone(&out);
    stats.borrow_mut().bind_exec(move |cx, _, _| {
        for (name, uses) in cx.command_stats() {
            print(&format!("{name:>12} {uses}"));
        }
        Ok(Value::Boolean(true))
    });

    let echo = dispatcher.create_with(
        dispatcher
            .builder("echo")
            .spec("g")
            .tags(["text"])
            .arity(1, 1)
            .help("Print the text back."),
    )?;
    let print = Rc::clone(&out);
    echo.borrow_mut().bind_exec(move |_, _, args| {
        print(args.str(0).unwrap_or_default());
        Ok(Value::Boolean(true))
    });

    let sum = dispatcher.create_with(
        dispatcher
            .builder("sum")
            .spec("f|f")
            .tags(["a", "b"])
            .arity(2, 2)
            .associative(true)
            .help("Add two numbers."),
    )?;
    let print = Rc::clone(&out);
    sum.borrow_mut().bind_exec(move |_, _, args| {
        let operand = |tag: &str| {
            args.by_tag(tag)
                .and_then(Value::as_float)
                .ok_or_else(|| CallbackError::new(format!("'{tag}' is not a number")))
        };
        let total = operand("a")? + operand("b")?;
        print(&total.to_string());
        Ok(Value::Boolean(true))
    });

    let whoami = dispatcher.create_with(
        dispatcher
            .builder("whoami")
            .arity(0, 0)
            .help("Show the session running this console."),
    )?;
    let print = Rc::clone(&out);
    whoami.borrow_mut().bind_exec(move |_, invoker, _| {
        print(&format!(
            "{} (id {}, authority {})",
            invoker.name, invoker.id, invoker.authority
        ));
        Ok(Value::Boolean(true))
    });

    let repeat = dispatcher.create_with(
        dispatcher
            .builder("repeat")
            .spec("i|g")
            .tags(["count", "command"])
            .arity(2, 2)
            .help("Run a command line several times."),
    )?;
    repeat
        .borrow_mut()
        .bind_exec(|cx, invoker, args| repeat_command(cx, invoker, args));

    let quit = dispatcher.create_with(
        dispatcher
            .builder("quit")
            .arity(0, 0)
            .help("Leave the console."),
    )?;
    let flag = Rc::clone(&state.quit);
    quit.borrow_mut().bind_exec(move |_, _, _| {
        flag.set(true);
        Ok(Value::Boolean(true))
    });

    Ok(state)
}

fn help_command(cx: &Dispatcher, print: &Printer, args: &Arguments) -> CallbackResult<Value> {
    if let Some(name) = args.str(0) {
        let found = cx.find_by_name(name).map_err(CallbackError::new)?;
        let listener = found.ok_or_else(|| CallbackError::new(format!("no such command: {name}")))?;
        let listener = listener.borrow();
        print(&format!("usage: {} {}", listener.name(), listener.info()));
        if !listener.help().is_empty() {
            print(listener.help());
        }
        return Ok(Value::Boolean(true));
    }

    let mut listeners = cx.listeners();
    listeners.sort_by(|a, b| a.borrow().name().cmp(b.borrow().name()));
    for listener in &listeners {
        let listener = listener.borrow();
        print(&format!("{:<8} {}", listener.name(), listener.help()));
    }
    Ok(Value::Integer(listeners.len() as i64))
}

fn repeat_command(cx: &Dispatcher, invoker: &Invoker, args: &Arguments) -> CallbackResult<Value> {
    let count = args
        .get(0)
        .and_then(Value::as_integer)
        .ok_or_else(|| CallbackError::new("count must be an integer"))?;
    if !(1..=MAX_REPEAT).contains(&count) {
        return Err(CallbackError::new(format!(
            "count must be between 1 and {MAX_REPEAT}"
        )));
    }
    let line = args.str(1).unwrap_or_default();

    let succeeded = (0..count)
        .filter(|_| cx.dispatch(invoker.id, line).is_success())
        .count();
    Ok(Value::Integer(succeeded as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::core::{Invoker, SessionTable};
    use std::cell::RefCell;

    fn console() -> (Dispatcher, ConsoleState, Rc<RefCell<Vec<String>>>) {
        let sessions = SessionTable::new();
        sessions.insert(Invoker::new(0, "console", 0));
        let dispatcher = Dispatcher::new(Rc::new(sessions));
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let state = install(&dispatcher, Rc::new(move |line: &str| {
            sink.borrow_mut().push(line.to_owned())
        }))
        .unwrap();
        (dispatcher, state, lines)
    }

    #[test]
    fn test_echo_and_sum() {
        let (dispatcher, _, lines) = console();
        assert_eq!(dispatcher.run(0, "echo   hello  world"), 1);
        assert_eq!(dispatcher.run(0, "sum 2 3.5"), 1);
        assert_eq!(*lines.borrow(), vec!["hello  world", "5.5"]);
    }

    #[test]
    fn test_sum_rejects_words() {
        let (dispatcher, _, lines) = console();
        assert_eq!(dispatcher.run(0, "sum two 3"), -1);
        assert!(lines.borrow()[0].starts_with("error [UnsupportedArg]"));
    }

    #[test]
    fn test_help_lists_and_describes() {
        let (dispatcher, _, lines) = console();
        assert_eq!(dispatcher.run(0, "help"), 7);
        assert!(lines.borrow()[0].starts_with("echo"));
        lines.borrow_mut().clear();

        assert_eq!(dispatcher.run(0, "help SUM"), 1);
        assert_eq!(lines.borrow()[0], "usage: sum <a:float> <b:float>");
    }

    #[test]
    fn test_repeat_runs_nested_commands() {
        let (dispatcher, _, lines) = console();
        assert_eq!(dispatcher.run(0, "repeat 3 echo hi"), 3);
        assert_eq!(*lines.borrow(), vec!["hi", "hi", "hi"]);
        assert!(!dispatcher.is_context());
        assert_eq!(dispatcher.run(0, "repeat 0 echo hi"), -1);
    }

    #[test]
    fn test_whoami_and_quit() {
        let (dispatcher, state, lines) = console();
        assert_eq!(dispatcher.run(0, "whoami"), 1);
        assert_eq!(lines.borrow()[0], "console (id 0, authority 0)");
        assert!(!state.should_quit());
        assert_eq!(dispatcher.run(0, "quit"), 1);
        assert!(state.should_quit());
    }

    #[test]
    fn test_stats_counts_uses() {
        let (dispatcher, _, lines) = console();
        dispatcher.run(0, "echo a");
        dispatcher.run(0, "echo b");
        lines.borrow_mut().clear();
        dispatcher.run(0, "stats");
        let out = lines.borrow();
        assert_eq!(out[0].split_whitespace().collect::<Vec<_>>(), vec!["echo", "2"]);
        assert_eq!(out[1].split_whitespace().collect::<Vec<_>>(), vec!["stats", "1"]);
    }
}
