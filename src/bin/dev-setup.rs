use devenv::cli::{self, Command, FlowCli};

fn main() {
    let cli = FlowCli::parse_as(
        "dev-setup",
        "Build and start containers, then wait until they are ready",
    );
    cli::main_for(Command::Setup, cli.global);
}
