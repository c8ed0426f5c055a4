//! Tooling Layer
//!
//! The `arbor` command line: argument parsing, command execution, and
//! output rendering.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
