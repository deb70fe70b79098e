//! Mill CLI - Command line tool for drilling into production and stock data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "mill-cli",
    version,
    about = "Mill production/stock drill-down toolkit"
)]
struct Cli {
    #[command(flatten)]
    connection: mill_cmd::ConnectionArgs,

    #[command(subcommand)]
    command: mill_cmd::Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("[Mill] Starting mill-cli");
    mill_cmd::run(cli.connection, cli.command).await
}
