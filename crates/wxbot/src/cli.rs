//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use wxbot_domain::ConversationId;
use wxbot_domain::error::Result;
use wxbot_infrastructure::ConfigLoader;
use wxbot_infrastructure::logging::{init_logging, log_config_loaded};

use crate::commands;

#[derive(Debug, Parser)]
#[command(name = "wxbot")]
#[command(about = "Weather bot backend: cache refresh, lookups and broker relay")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the refresh loop and report relay until SIGINT/SIGTERM (default)
    Run,

    /// Look up current weather for one or more places and print JSON lines
    Lookup {
        /// Conversation the lookups are attributed to
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        conversation: i64,

        /// Place names, e.g. "Санкт-Петербург"
        #[arg(required = true)]
        places: Vec<String>,
    },

    /// Print the 3-hourly forecast for a place as JSON lines
    Forecast {
        /// Conversation the place is selected in
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        conversation: i64,

        /// Place name
        place: String,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List the registered cache providers
    Providers,
}

impl Cli {
    /// Load configuration, install logging and dispatch the subcommand
    pub async fn execute(self) -> Result<()> {
        let loader = match &self.config {
            Some(path) => ConfigLoader::new().with_config_path(path),
            None => ConfigLoader::new(),
        };
        let config = loader.load()?;
        init_logging(&config.logging)?;
        log_config_loaded(loader.resolve_config_path()?.as_deref());

        match self.command.unwrap_or(Command::Run) {
            Command::Run => {
                info!(env = ?config.env, "Starting wxbot");
                commands::run(config).await
            }
            Command::Lookup {
                conversation,
                places,
            } => {
                let mut stdout = std::io::stdout();
                let summary =
                    commands::lookup(config, ConversationId(conversation), &places, &mut stdout)
                        .await?;
                summary.into_result()
            }
            Command::Forecast {
                conversation,
                place,
            } => {
                commands::forecast(
                    config,
                    ConversationId(conversation),
                    &place,
                    &mut std::io::stdout(),
                )
                .await?;
                Ok(())
            }
            Command::Config { output } => {
                commands::config(&loader, &config, output.as_deref(), &mut std::io::stdout())
            }
            Command::Providers => commands::providers(&mut std::io::stdout()),
        }
    }
}
