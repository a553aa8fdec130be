use anyhow::Result;
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::config;
use crate::runner::ShellRunner;

#[derive(Parser)]
#[command(
    name = "devenv",
    about = "Start and stop the local multi-service development environment"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the user config dir, then built-in defaults)
    #[arg(long, global = true, env = "DEVENV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log diagnostics to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop containers, remove volumes and prune unused images
    Clean,
    /// Build and start containers, then wait until they are ready
    Setup,
}

/// Arguments of the single-flow binaries (`dev-clean`, `dev-setup`).
#[derive(Parser)]
pub struct FlowCli {
    #[command(flatten)]
    pub global: GlobalArgs,
}

impl FlowCli {
    pub fn parse_as(bin_name: &'static str, about: &'static str) -> Self {
        let matches = Self::command().name(bin_name).about(about).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// Entry point shared by all binaries. Exits with status 1 on failure.
pub fn main_for(command: Command, global: GlobalArgs) {
    crate::logging::init(global.debug);

    if let Err(e) = run(command, &global) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

pub fn run(command: Command, global: &GlobalArgs) -> Result<()> {
    let config = config::load_config_or_default(global.config.as_deref())?;
    let mut runner = ShellRunner::new(config.compose.project_dir.clone());

    match command {
        Command::Clean => {
            let result = commands::cmd_clean(&mut runner, &config)?;
            output(&result, commands::format_clean_human);
        }
        Command::Setup => {
            let result = commands::cmd_setup(&mut runner, &config, &mut std::thread::sleep)?;
            output(&result, commands::format_setup_human);
        }
    }
    Ok(())
}

fn output<T>(result: &T, human_fn: fn(&T) -> String) {
    let text = human_fn(result);
    if !text.is_empty() {
        println!("{}", text);
    }
}
