//! bloom-cli - estimate whether spring flowering is early, late or on time.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "bloom-cli",
    version,
    about = "Washington spring bloom timing toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: bloom_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("starting {}", env!("CARGO_PKG_NAME"));
    bloom_cmd::run(cli.command)
}
