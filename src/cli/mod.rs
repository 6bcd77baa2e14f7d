//! Command line interface for kodegen_release_upload.
//!
//! Thin glue over the library: parse inputs, resolve configuration, run the
//! release, map the outcome to an exit code and the `result` output.

mod args;
pub mod commands;
mod output;

pub use args::Args;
pub use commands::execute_command;
pub use output::OutputManager;

use crate::config::EnvConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let env = EnvConfig::from_env();
    execute_command(args, &env).await
}
