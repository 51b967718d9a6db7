//! Monitoring console for a Gemini key-rotation proxy.
//!
//! The console polls the proxy's call log, keeps full error diagnostics for
//! failed calls, and drives the proxy's bulk key validation.

pub mod cli;
pub mod client;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod key_check;
pub mod platform;
pub mod poller;
pub mod registry;
pub mod render;
pub mod secrets;
pub mod session;
pub mod status;
pub mod sync;
pub mod telemetry;
pub mod types;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

pub use cli::{Cli, Command};
pub use client::{ConsoleApi, ConsoleClient};
pub use config::ConsoleConfig;
pub use diagnostic::DiagnosticModalController;
pub use error::{ConsoleError, KeyCheckError, Result, SyncError};
pub use key_check::{KeyValidationController, mask_key};
pub use registry::ErrorRegistry;
pub use secrets::AuthToken;
pub use sync::{LogSynchronizer, RequestToken, SyncOutcome, SyncReport};
pub use types::{KeyCheckResult, LogEntry, LogStatus, ServiceStatus};
pub use view::{LogView, RenderInstruction};

use crate::cli::{CheckKeysArgs, LogsArgs};
use crate::key_check::CopyInvalidFeedback;
use crate::platform::{BrowserOpener, SystemClipboard};
use crate::telemetry::TelemetryConfig;

/// Entry point shared by the binary: install logging, resolve settings and
/// dispatch the subcommand.
pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    telemetry::init_with_config(
        env!("CARGO_PKG_NAME"),
        TelemetryConfig::default().with_format(cli.log_format),
    );

    let config = ConsoleConfig::from_cli(&cli)?;
    let client = ConsoleClient::new(&config.base_url, config.auth.clone())
        .context("failed to build HTTP client")?;
    tracing::debug!(base_url = client.base_url(), "console configured");

    match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => run_watch(client, &config).await,
        Command::Status => run_status(&client).await,
        Command::Logs(args) => run_logs(&client, args).await,
        Command::CheckKeys(args) => run_check_keys(&client, &config, args).await,
    }
}

async fn run_watch(client: ConsoleClient, config: &ConsoleConfig) -> anyhow::Result<()> {
    session::run(
        Arc::new(client),
        config.auth.clone(),
        DiagnosticModalController::new(config.assistant_url.as_str()),
        Box::new(SystemClipboard::new()),
        Box::new(BrowserOpener),
        std::io::stdout(),
    )
    .await
    .context("watch session failed")
}

async fn run_status(client: &ConsoleClient) -> anyhow::Result<()> {
    let report = status::probe(client).await;
    println!("{}", render::status(&report));
    match report {
        status::StatusReport::Healthy { .. } => Ok(()),
        status::StatusReport::Unavailable(reason) => anyhow::bail!("proxy unavailable: {reason}"),
    }
}

async fn run_logs(client: &ConsoleClient, args: LogsArgs) -> anyhow::Result<()> {
    let mut synchronizer = LogSynchronizer::new();
    let report = synchronizer.sync(client).await;
    let mut view = LogView::new();
    view.apply_all(report.instructions);

    let mut out = std::io::stdout().lock();
    write!(out, "{}", render::log_view(&view))?;

    if args.errors {
        for card in view.cards().iter().filter(|card| card.inspectable) {
            let text = synchronizer
                .registry()
                .get(&card.id)
                .unwrap_or(diagnostic::FALLBACK_TEXT);
            writeln!(out, "--- {} ---\n{text}", card.id)?;
        }
    }
    out.flush()?;

    if let SyncOutcome::Failed(err) = report.outcome {
        return Err(err).context("fetching call log");
    }
    Ok(())
}

async fn run_check_keys(
    client: &ConsoleClient,
    config: &ConsoleConfig,
    args: CheckKeysArgs,
) -> anyhow::Result<()> {
    let mut controller = KeyValidationController::new();
    let outcome = controller
        .check_keys(client, config.auth.as_ref())
        .await
        .map(|_| ());
    println!("{}", render::key_check(&controller));
    outcome?;

    if args.copy_invalid {
        let mut clipboard = SystemClipboard::new();
        match controller.copy_invalid_keys(&mut clipboard) {
            CopyInvalidFeedback::Copied { count } => {
                println!("Copied {count} invalid keys to the clipboard.")
            }
            CopyInvalidFeedback::NothingToCopy => println!("No invalid keys to copy."),
            CopyInvalidFeedback::Failed(err) => return Err(err.into()),
        }
    }
    Ok(())
}
