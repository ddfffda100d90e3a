//! # gatebot-runner
//!
//! Runs several Telegram bots side by side. Each valid credential gets a [`ClientSession`] whose
//! dispatcher holds the standard handler set (gated start and echo replies, forwarding to the log
//! channel). [`MultiSessionRunner`] starts and stops the sessions concurrently; [`run`] wires it to
//! the Telegram transport and config files.

pub mod config;
pub mod credentials;
pub mod runner;
pub mod session;

pub use config::{load_texts, RunnerConfig};
pub use credentials::{
    load_credentials, validate_credentials, ExclusionReason, Excluded, RawCredential,
    ValidatedCredentials,
};
pub use runner::{MultiSessionRunner, RunSummary, RunnerState, SessionFailure};
pub use session::ClientSession;

use gatebot_telegram::TelegramClientFactory;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Loads translation data and credentials, builds Telegram sessions, and runs until `shutdown` fires.
///
/// Returns a config error (fatal) when translation data is missing or no credential is valid.
#[instrument(skip_all, fields(bots_file = %config.bots_file.display()))]
pub async fn run(config: RunnerConfig, shutdown: CancellationToken) -> anyhow::Result<RunSummary> {
    let texts = config.texts()?;
    let raw = config.credentials()?;
    let factory = TelegramClientFactory::new(config.telegram.clone());

    let mut runner = MultiSessionRunner::new();
    runner.initialize(&raw, &factory, &config.channels, &texts)?;

    info!(
        valid = runner.valid_count(),
        log_channel = ?config.channels.log_channel,
        auth_channel = ?config.channels.auth_channel,
        "Starting bots"
    );
    Ok(runner.run_until(shutdown).await)
}
