pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod readiness;
pub mod runner;

mod testutil;

pub use error::{CommandFailed, FailureReason};
pub use runner::{run_command_with, CommandRunner, ShellRunner};
