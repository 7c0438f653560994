//! cmdloop entry point.
//!
//! Reads commands from stdin and writes replies to stdout. The configuration
//! file is taken from the first argument or `CMDLOOP_CONFIG`; without either
//! the defaults are used. The process exits with the status passed to
//! `exitf`, or 0 when input ends.

use std::io;
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use cmdloop_terminal::{ReaderSource, Shell};
use cmdloop_types::config::ShellConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    panic::set_hook(Box::new(log_panic));

    let config = match config_path() {
        Some(path) => ShellConfig::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ShellConfig::default(),
    };
    log::info!(
        "Starting cmdloop {} (demo commands: {})",
        env!("CARGO_PKG_VERSION"),
        config.demo_commands,
    );

    let source = ReaderSource::new(io::stdin().lock());
    let mut shell = Shell::new(config, source, io::stdout())?;
    let status = shell.run()?;

    log::info!("cmdloop finished with status {status}");
    std::process::exit(status);
}

/// Report panics through the logger instead of raw stderr.
///
/// Handler panics are already answered with the shell's apology, so the
/// location is only of interest at debug level.
fn log_panic(info: &PanicHookInfo<'_>) {
    log::debug!("{info}");
}

/// Config file from the first CLI argument or `CMDLOOP_CONFIG`.
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("CMDLOOP_CONFIG"))
        .map(PathBuf::from)
}
