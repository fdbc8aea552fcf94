//! wxbot binary entry point

// Force linkme registration of all providers from wxbot-providers
extern crate wxbot_providers;

use clap::Parser;
use wxbot::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Cli::parse().execute().await?;
    Ok(())
}
