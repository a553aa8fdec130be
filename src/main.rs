use clap::Parser;
use devenv::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    cli::main_for(cli.command, cli.global);
}
