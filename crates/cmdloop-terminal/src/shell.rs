//! The polling dispatch loop.
//!
//! A [`Shell`] owns the registry, configuration, input source and output
//! sink. Every tick it reads one line, resolves the leading token, parses the
//! line against the matched command's flags and runs the handler behind a
//! recovery boundary. Ticks never overlap: the loop runs on the caller's
//! thread and the read is the only place it blocks.

use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use cmdloop_types::config::ShellConfig;
use cmdloop_types::error::{Result, ShellError};

use crate::builtin_commands::register_builtins;
use crate::command::{Command, Context, HelpRenderer, Outcome};
use crate::math_commands::register_math_commands;
use crate::parser::parse;
use crate::registry::CommandRegistry;
use crate::source::LineSource;

/// Reply written when a handler fails.
pub const APOLOGY: &str = "Sorry, an error occurred. Try again!";

/// Result of dispatching a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A command ran to completion.
    Executed,
    /// A command failed and the failure was reported.
    Failed,
    /// No command answers to the leading token.
    NoMatch,
    /// A command asked the host to exit.
    Exit(i32),
}

/// Cloneable switch that halts [`Shell::run`] at the next tick boundary.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A configured shell instance.
pub struct Shell<W: Write> {
    config: ShellConfig,
    registry: CommandRegistry,
    source: Box<dyn LineSource>,
    out: W,
    help: Option<HelpRenderer>,
    /// Set once a command matched during the current cycle.
    fired: bool,
    last_line: Option<String>,
    stop: StopHandle,
}

impl<W: Write> Shell<W> {
    /// Build a shell with the built-in commands, plus the demo arithmetic
    /// commands when `demo_commands` is set.
    pub fn new(config: ShellConfig, source: impl LineSource + 'static, out: W) -> Result<Self> {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry)?;
        if config.demo_commands {
            register_math_commands(&mut registry)?;
        }
        Self::with_registry(config, registry, source, out)
    }

    /// Build a shell around exactly the given registry.
    pub fn with_registry(
        config: ShellConfig,
        registry: CommandRegistry,
        source: impl LineSource + 'static,
        out: W,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry,
            source: Box::new(source),
            out,
            help: None,
            fired: false,
            last_line: None,
            stop: StopHandle::default(),
        })
    }

    /// Replace the default `helpf` listing.
    pub fn set_help_renderer<F>(&mut self, render: F)
    where
        F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.help = Some(Box::new(render));
    }

    /// Add a command after construction. See [`CommandRegistry::register`].
    pub fn register(&mut self, cmd: Command) {
        self.registry.register(cmd);
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Whether a command has matched in the current cycle.
    pub fn fired(&self) -> bool {
        self.fired
    }

    /// The most recently dispatched line.
    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Print the start banner when echo is enabled.
    pub fn start(&mut self) -> Result<()> {
        if self.config.echo {
            writeln!(self.out, "{}", self.config.start_message)?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Run ticks until a command exits, input ends, or the stop handle fires.
    ///
    /// Returns the exit status for the host. A cycle that overruns the period
    /// is followed immediately by the next one; missed ticks are not queued.
    pub fn run(&mut self) -> Result<i32> {
        self.start()?;
        let period = self.config.poll_period();
        log::info!(
            "dispatch loop started ({} commands, period {period:?})",
            self.registry.len()
        );
        let mut next_tick = Instant::now();
        loop {
            if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
            if self.stop.is_stopped() {
                log::info!("dispatch loop stopped");
                return Ok(0);
            }
            match self.tick()? {
                None => {
                    log::info!("input closed, leaving dispatch loop");
                    return Ok(0);
                },
                Some(Dispatch::Exit(status)) => {
                    log::info!("exit requested with status {status}");
                    return Ok(status);
                },
                Some(_) => {},
            }
            next_tick = (next_tick + period).max(Instant::now());
        }
    }

    /// One read/resolve/execute cycle. Returns `None` at end of input.
    pub fn tick(&mut self) -> Result<Option<Dispatch>> {
        if self.config.echo {
            write!(self.out, "{} ", self.config.input_prefix)?;
            self.out.flush()?;
        }
        match self.source.next_line()? {
            Some(line) => self.dispatch_line(&line).map(Some),
            None => Ok(None),
        }
    }

    /// Route a complete line through resolve, parse and execute without
    /// waiting for a tick.
    pub fn run_query(&mut self, query: &str) -> Result<Dispatch> {
        self.dispatch_line(query)
    }

    /// Invoke `name` with positional `args` and `"flag value"` strings.
    ///
    /// Synthesizes `"<name> <flags...> <args>"` and dispatches it like any
    /// other line.
    pub fn run_command(&mut self, name: &str, args: &str, flags: &[&str]) -> Result<Dispatch> {
        let mut line = name.to_string();
        for flag in flags.iter().chain(std::iter::once(&args)) {
            if !flag.is_empty() {
                line.push(' ');
                line.push_str(flag);
            }
        }
        self.run_query(&line)
    }

    fn dispatch_line(&mut self, line: &str) -> Result<Dispatch> {
        let line = line.trim();
        self.last_line = Some(line.to_string());
        let token = line.split(' ').next().unwrap_or_default();

        let result = match self.registry.resolve(token) {
            Some(cmd) => {
                self.fired = true;
                let names: Vec<&str> = cmd.invocation_names().collect();
                let input = parse(line, cmd.flags(), &names);
                log::debug!("'{token}' resolved to '{}': {input:?}", cmd.name());
                let mut ctx = Context::new(
                    &input,
                    &self.registry,
                    &self.config,
                    &mut self.out,
                    self.source.as_mut(),
                )
                .with_help(self.help.as_ref());
                execute(cmd, &mut ctx)
            },
            None => {
                log::debug!("no command answers to '{token}'");
                Ok(Dispatch::NoMatch)
            },
        };

        // The flag is per cycle, even when the sink failed mid-command.
        let fired = std::mem::take(&mut self.fired);
        let dispatch = result?;
        if !fired {
            writeln!(self.out, "{}", self.config.no_command_message)?;
        }
        self.out.flush()?;
        Ok(dispatch)
    }
}

/// Run a handler, turning an error or panic into the apology line.
///
/// Only failures writing the report itself escape.
fn execute(cmd: &Command, ctx: &mut Context<'_>) -> Result<Dispatch> {
    let failure = match panic::catch_unwind(AssertUnwindSafe(|| cmd.run(ctx))) {
        Ok(Ok(Outcome::Done)) => return Ok(Dispatch::Executed),
        Ok(Ok(Outcome::Exit { status })) => return Ok(Dispatch::Exit(status)),
        Ok(Err(e)) => error_chain(&e),
        Err(payload) => vec![format!("panicked: {}", panic_message(payload.as_ref()))],
    };
    log::error!("command '{}' failed: {}", cmd.name(), failure.join(": "));

    ctx.replyln(APOLOGY)?;
    if ctx.config().print_stack_trace {
        for (i, line) in failure.iter().enumerate() {
            if i == 0 {
                ctx.replyln(line)?;
            } else {
                ctx.replyln(&format!("  caused by: {line}"))?;
            }
        }
    }
    Ok(Dispatch::Failed)
}

fn error_chain(e: &ShellError) -> Vec<String> {
    let mut lines = vec![e.to_string()];
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        lines.push(cause.to_string());
        source = cause.source();
    }
    lines
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
