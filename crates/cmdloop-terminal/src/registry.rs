//! Ordered command registry with case-insensitive lookup.
//!
//! Registration order is lookup priority: when two commands answer to the same
//! token, the one registered first wins and the later one is shadowed for that
//! token.

use cmdloop_types::error::{Result, ShellError};

use crate::command::Command;

/// Registry of available commands.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    ///
    /// Tokens already claimed by an earlier command stay with that command;
    /// each shadowed token is logged as a warning.
    pub fn register(&mut self, cmd: Command) {
        for token in cmd.invocation_names() {
            if let Some(existing) = self.resolve(token) {
                log::warn!(
                    "'{token}' of command '{}' is shadowed by earlier command '{}'",
                    cmd.name(),
                    existing.name()
                );
            }
        }
        self.commands.push(cmd);
    }

    /// Append a command, refusing it if any of its tokens is already taken.
    pub fn try_register(&mut self, cmd: Command) -> Result<()> {
        if let Some((token, existing)) = cmd
            .invocation_names()
            .find_map(|t| self.resolve(t).map(|c| (t, c)))
        {
            return Err(ShellError::Collision {
                token: token.to_string(),
                existing: existing.name().to_string(),
            });
        }
        self.commands.push(cmd);
        Ok(())
    }

    /// Find the first command whose name or alias equals `token`, ignoring case.
    pub fn resolve(&self, token: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.answers_to(token))
    }

    /// Look up a command by its canonical name only, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Commands whose category is not hidden, in registration order.
    pub fn list_visible(&self) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|c| !c.category().is_hidden())
            .collect()
    }

    /// All commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
