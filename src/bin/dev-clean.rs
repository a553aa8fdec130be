use devenv::cli::{self, Command, FlowCli};

fn main() {
    let cli = FlowCli::parse_as(
        "dev-clean",
        "Stop containers, remove volumes and prune unused images",
    );
    cli::main_for(Command::Clean, cli.global);
}
