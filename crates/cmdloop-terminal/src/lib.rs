//! Command loop and terminal subsystem.
//!
//! Commands are registered by name and alias in a [`CommandRegistry`]. The
//! [`Shell`] polls a [`LineSource`] on a fixed period, resolves the first
//! token of each line, parses the rest against the command's [`FlagSpec`] and
//! runs the handler behind a recovery boundary.

pub mod builtin_commands;
mod command;
mod flags;
pub mod math_commands;
mod parser;
mod registry;
mod shell;
mod source;

/// Register the built-in commands (helpf, versionf, exitf) into a registry.
pub use builtin_commands::register_builtins;
/// Presentation metadata for help listings.
pub use command::Category;
/// A command descriptor: name, aliases, flags, category and handler.
pub use command::Command;
/// Builder returned by [`Command::builder`].
pub use command::CommandBuilder;
/// Everything a handler can reach while it runs.
pub use command::Context;
pub use command::{Handler, HelpRenderer, Outcome};
/// Flag declarations for a command.
pub use flags::{FlagSpec, ParamFlag};
/// Register the demo arithmetic commands into a registry.
pub use math_commands::register_math_commands;
/// Tokenize a line against a command's flags.
pub use parser::{MissingParam, ParsedInput, parse};
/// Ordered registry of commands with case-insensitive lookup.
pub use registry::CommandRegistry;
/// The polling dispatch loop.
pub use shell::{APOLOGY, Dispatch, Shell, StopHandle};
/// Input sources for the dispatch loop.
pub use source::{LineSource, QueueSource, ReaderSource};
