//! Foundation types for cmdloop.
//!
//! Shared by every cmdloop crate: the error enum with its `Result` alias and
//! the serde-backed shell configuration.

pub mod config;
pub mod error;
