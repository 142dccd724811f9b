//! Command line interface for ghrel.
//!
//! Argument parsing, command execution, and terminal output.

pub mod args;
pub mod commands;
mod output;
pub mod render;

pub use args::{Args, AssetCommand, Command, RefCommand, ReleaseCommand};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<()> {
    let args = Args::parse_args();
    execute_command(args).await
}
