//! Error types for cmdloop.

use std::io;

/// Errors produced by the cmdloop framework.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("'{token}' is already registered by command '{existing}'")]
    Collision { token: String, existing: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
