//! CLI module for hotrelay - command-line interface and subcommands.
//!
//! Provides the main entry point with a default relay run and a status
//! report over the record store.

pub mod commands;

pub use commands::{Cli, Commands};
