//! VBOS CLI - command line client for the VBOS dashboard API.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "vbos",
    version,
    about = "VBOS disaster-risk statistics toolkit"
)]
struct Cli {
    #[command(flatten)]
    config: vbos_cmd::Config,

    #[command(subcommand)]
    command: vbos_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    debug!("using API at {}", cli.config.api_host);
    vbos_cmd::run(cli.config, cli.command).await
}
