//! Command descriptors and the context handed to their handlers.
//!
//! A command is plain data (name, aliases, flags, category) plus a handler
//! function value. Dispatch never needs to know a command's concrete type.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use cmdloop_types::config::ShellConfig;
use cmdloop_types::error::{Result, ShellError};

use crate::flags::FlagSpec;
use crate::parser::ParsedInput;
use crate::registry::CommandRegistry;
use crate::source::LineSource;

/// What the shell should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep polling.
    Done,
    /// Stop the loop and hand `status` to the host.
    Exit { status: i32 },
}

/// Handler invoked when a command is dispatched.
pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> Result<Outcome> + Send + Sync>;

/// Replacement for the default `helpf` listing.
pub type HelpRenderer = Box<dyn Fn(&mut Context<'_>) -> Result<()> + Send + Sync>;

/// Presentation metadata used by help rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Category {
    name: Option<String>,
    hidden: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            hidden: false,
        }
    }

    /// A named category left out of help listings.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            hidden: true,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// A registered command.
#[derive(Clone, Serialize)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    help: Option<String>,
    usage: Option<String>,
    flags: FlagSpec,
    category: Category,
    #[serde(skip)]
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Start describing a command invoked as `name`.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            aliases: Vec::new(),
            help: None,
            usage: None,
            flags: FlagSpec::new(),
            category: Category::default(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// One-line description.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Positional argument hint, e.g. `[value] ...`.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn flags(&self) -> &FlagSpec {
        &self.flags
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// The name followed by every alias.
    pub fn invocation_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Case-insensitive match against the name and aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.invocation_names().any(|n| n.eq_ignore_ascii_case(token))
    }

    /// Run the handler. Failures are returned as-is; recovery is the
    /// shell's job.
    pub fn run(&self, ctx: &mut Context<'_>) -> Result<Outcome> {
        (self.handler)(ctx)
    }
}

/// Builder for [`Command`].
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    help: Option<String>,
    usage: Option<String>,
    flags: FlagSpec,
    category: Category,
    handler: Option<Handler>,
}

impl CommandBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn flags(mut self, flags: FlagSpec) -> Self {
        self.flags = flags;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Result<Outcome> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Finish the command, checking its invocation tokens and flags.
    pub fn build(self) -> Result<Command> {
        let handler = self
            .handler
            .ok_or_else(|| ShellError::Config(format!("command '{}' has no handler", self.name)))?;
        for token in std::iter::once(&self.name).chain(&self.aliases) {
            if token.is_empty() || token.contains(char::is_whitespace) {
                return Err(ShellError::Config(format!(
                    "invalid invocation token '{token}' for command '{}'",
                    self.name
                )));
            }
        }
        self.flags.validate()?;
        Ok(Command {
            name: self.name,
            aliases: self.aliases,
            help: self.help,
            usage: self.usage,
            flags: self.flags,
            category: self.category,
            handler,
        })
    }
}

/// Everything a handler can reach while it runs.
pub struct Context<'a> {
    input: &'a ParsedInput,
    registry: &'a CommandRegistry,
    config: &'a ShellConfig,
    out: &'a mut dyn Write,
    source: &'a mut dyn LineSource,
    help: Option<&'a HelpRenderer>,
}

impl<'a> Context<'a> {
    pub fn new(
        input: &'a ParsedInput,
        registry: &'a CommandRegistry,
        config: &'a ShellConfig,
        out: &'a mut dyn Write,
        source: &'a mut dyn LineSource,
    ) -> Self {
        Self {
            input,
            registry,
            config,
            out,
            source,
            help: None,
        }
    }

    /// Attach a custom help renderer.
    pub fn with_help(mut self, help: Option<&'a HelpRenderer>) -> Self {
        self.help = help;
        self
    }

    pub fn input(&self) -> &ParsedInput {
        self.input
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        self.config
    }

    pub fn help_renderer(&self) -> Option<&'a HelpRenderer> {
        self.help
    }

    /// Value of a matched parameter flag.
    pub fn param(&self, flag: &str) -> Option<&str> {
        self.input.param(flag)
    }

    /// The configured missing-parameter message, if parsing found one.
    pub fn missing_param_message(&self) -> Option<String> {
        self.input
            .missing_param()
            .map(|m| self.config.missing_param(&m.flag, &m.placeholder))
    }

    /// Write text without a trailing newline.
    pub fn reply(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    pub fn replyln(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn newline(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    /// Write `text` between two rules of `border` repeated `len` times.
    pub fn reply_with_border(&mut self, text: &str, border: char, len: usize) -> Result<()> {
        let rule: String = std::iter::repeat_n(border, len).collect();
        self.replyln(&rule)?;
        self.replyln(text)?;
        self.replyln(&rule)
    }

    pub fn debug(&mut self, text: &str) -> Result<()> {
        self.replyln(&format!("[DEBUG] {text}"))
    }

    /// Read one more line from the shell's input while the command runs.
    ///
    /// `prompt` is written on its own line first. The input prefix is shown
    /// when echo is enabled. Returns `None` if the input is exhausted.
    pub fn read_line(&mut self, prompt: Option<&str>) -> Result<Option<String>> {
        if let Some(prompt) = prompt {
            self.replyln(prompt)?;
        }
        if self.config.echo {
            write!(self.out, "{} ", self.config.input_prefix)?;
        }
        self.out.flush()?;
        self.source.next_line()
    }
}
