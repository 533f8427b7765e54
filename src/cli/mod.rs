//! CLI module for dockrun
//!
//! Provides command-line interface with the following subcommands:
//! - `docker` - Run a container engine command
//! - `compose` - Run a compose tool command
//! - `detect` - Show where the configured executables resolve
//! - `config` - Show configuration

pub mod commands;

pub use commands::{Cli, Commands};
