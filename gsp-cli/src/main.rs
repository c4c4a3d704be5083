//! GSP CLI - irrigation water records, demand calculations and machine tracking.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "gsp-cli",
    version,
    about = "Irrigation union water management toolkit"
)]
struct Cli {
    #[command(flatten)]
    settings: gsp_cmd::Settings,

    #[command(subcommand)]
    command: gsp_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Backend: {}", cli.settings.api_url);
    gsp_cmd::run(cli.command, &cli.settings).await
}
