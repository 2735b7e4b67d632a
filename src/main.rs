//! slcmd - interactive command console.
//!
//! Reads lines from stdin and runs each one through the dispatcher as the
//! configured console invoker.

use std::io::Write;
use std::rc::Rc;

use anyhow::Context as _;
use futures_util::StreamExt;
use slcmd::config::{self, Config, LoggingConfig};
use slcmd::handlers::console::{self, Printer};
use slcmd::handlers::{Dispatcher, Invoker, SessionTable};
use slcmd::metrics;
use slcmd::telemetry::spans;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{Instrument, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Longest accepted input line in bytes.
const MAX_LINE: usize = 4096;

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.with_target(true).init();
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => Config::default(),
    };

    init_tracing(&config.logging);

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s)", errors.len());
    }

    metrics::init();

    let console_cfg = &config.console;
    let sessions = Rc::new(SessionTable::new());
    sessions.insert(Invoker::new(
        console_cfg.invoker_id,
        console_cfg.name.clone(),
        console_cfg.authority,
    ));

    let dispatcher = Dispatcher::with_config(sessions, config.engine.clone());
    let printer: Printer = Rc::new(|line: &str| println!("{line}"));
    let state = console::install(&dispatcher, printer)?;

    info!(
        commands = dispatcher.count(),
        invoker = console_cfg.invoker_id,
        "Console ready"
    );

    let session = spans::session(&console_cfg.name, console_cfg.invoker_id);
    async {
        let mut lines = FramedRead::new(
            tokio::io::stdin(),
            LinesCodec::new_with_max_length(MAX_LINE),
        );

        prompt(&console_cfg.prompt)?;
        while let Some(line) = lines.next().await {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    let code = dispatcher.run(console_cfg.invoker_id, &line);
                    debug!(code, "Command finished");
                }
                Err(e) => warn!(error = %e, "Discarding unreadable line"),
            }

            if state.should_quit() {
                break;
            }
            prompt(&console_cfg.prompt)?;
        }
        anyhow::Ok(())
    }
    .instrument(session)
    .await?;

    info!("Console closed");
    Ok(())
}
