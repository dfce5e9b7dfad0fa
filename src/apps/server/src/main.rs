use anyhow::Result;
use clap::Parser;
use hsltalks_server::{logging, Cli, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug)?;

    let config = ServerConfig::from_cli(&cli)?;
    hsltalks_server::run(config).await
}
