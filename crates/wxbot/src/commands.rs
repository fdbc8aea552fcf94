//! Subcommand implementations
//!
//! Each command builds its own [`AppContext`](wxbot_infrastructure::AppContext)
//! and always runs the ordered shutdown before returning.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};
use wxbot_application::ports::registry::list_cache_providers;
use wxbot_application::use_cases::WeatherReport;
use wxbot_domain::ConversationId;
use wxbot_domain::error::{Error, Result};
use wxbot_infrastructure::config::{AppConfig, BrokerBackend, ConfigLoader, render_toml};
use wxbot_infrastructure::{AppContext, init_app};
use wxbot_infrastructure::shutdown::shutdown_signal;

/// Serve until SIGINT/SIGTERM, then shut down in order
pub async fn run(config: AppConfig) -> Result<()> {
    let context = init_app(config).await?;

    if let Err(e) = context.start().await {
        if let Err(close) = context.shutdown().await {
            warn!(error = %close, "Shutdown after failed start reported an error");
        }
        return Err(e);
    }

    info!("wxbot started, waiting for shutdown signal");
    shutdown_signal().await;
    info!("Shutdown signal received");

    context.shutdown().await
}

/// Outcome counts of a `lookup` invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl LookupSummary {
    /// `Err` when any place could not be looked up
    pub fn into_result(self) -> Result<()> {
        if self.failed == 0 {
            return Ok(());
        }
        Err(Error::provider(format!(
            "{} of {} lookups failed",
            self.failed,
            self.failed + self.succeeded
        )))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum LookupLine<'a> {
    Found(&'a WeatherReport),
    Failed { place: &'a str, error: String },
}

/// Context for one-shot commands: no refresh loop, no broker
async fn init_oneshot(mut config: AppConfig) -> Result<AppContext> {
    config.scheduler.enabled = false;
    config.broker.provider = BrokerBackend::Disabled;
    init_app(config).await
}

/// Look up every place in order and write one JSON line per place
///
/// A failed place is written as `{"place", "error"}` and does not stop
/// the others.
pub async fn lookup<W: Write>(
    config: AppConfig,
    conversation: ConversationId,
    places: &[String],
    out: &mut W,
) -> Result<LookupSummary> {
    let context = init_oneshot(config).await?;
    let lookup = context.lookup();
    let mut summary = LookupSummary::default();

    let mut written = Ok(());
    for place in places {
        let line = match lookup.current_weather(conversation, place).await {
            Ok(report) => {
                summary.succeeded += 1;
                serde_json::to_string(&LookupLine::Found(&report))
            }
            Err(e) => {
                warn!(%conversation, place = %place, error = %e, "Lookup failed");
                summary.failed += 1;
                serde_json::to_string(&LookupLine::Failed {
                    place,
                    error: e.to_string(),
                })
            }
        };
        written = line
            .map_err(Error::from)
            .and_then(|line| writeln!(out, "{line}").map_err(Error::from));
        if written.is_err() {
            break;
        }
    }

    let closed = context.shutdown().await;
    written?;
    closed?;
    Ok(summary)
}

/// Select `place` for the conversation, then write its forecast as one
/// JSON line per entry
///
/// Returns the number of entries written.
pub async fn forecast<W: Write>(
    config: AppConfig,
    conversation: ConversationId,
    place: &str,
    out: &mut W,
) -> Result<usize> {
    let context = init_oneshot(config).await?;
    let lookup = context.lookup();

    let written = async {
        lookup.current_weather(conversation, place).await?;
        let report = lookup.forecast(conversation).await?;
        for entry in &report.entries {
            writeln!(out, "{}", serde_json::to_string(entry)?)?;
        }
        info!(%conversation, place, entries = report.entries.len(), "Forecast written");
        Ok::<_, Error>(report.entries.len())
    }
    .await;

    let closed = context.shutdown().await;
    let count = written?;
    closed?;
    Ok(count)
}

/// Print the effective configuration as TOML, or save it to `output`
pub fn config<W: Write>(
    loader: &ConfigLoader,
    config: &AppConfig,
    output: Option<&Path>,
    out: &mut W,
) -> Result<()> {
    match output {
        Some(path) => {
            loader.save_to_file(config, path)?;
            info!(path = %path.display(), "Configuration saved");
            Ok(())
        }
        None => {
            out.write_all(render_toml(config)?.as_bytes())?;
            Ok(())
        }
    }
}

/// Write the registered cache providers, one `name<TAB>description` per line
pub fn providers<W: Write>(out: &mut W) -> Result<()> {
    let mut providers = list_cache_providers();
    providers.sort_unstable_by_key(|(name, _)| *name);
    for (name, description) in providers {
        writeln!(out, "{name}\t{description}")?;
    }
    Ok(())
}
