//! Entry point for the `gateway-console` binary.
use clap::Parser;
use gateway_console::Cli;
use gateway_console::run_main;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings may come from a local .env; flags still win.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    run_main(cli).await
}
