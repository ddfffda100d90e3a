//! gatebot CLI: run the bots or check the config. Config from env (.env loaded first) and optional flags.

mod cli;

use anyhow::{Context, Result};
use std::future::Future;
use clap::Parser;
use gatebot_core::init_tracing;
use gatebot_runner::{run, validate_credentials, RunnerConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { bots, locale } => {
            let config = RunnerConfig::load(bots, locale)?;
            init_tracing(&config.log_file)
                .with_context(|| format!("Initialize logging to {}", config.log_file))?;
            handle_run(config).await
        }
        Commands::Check { bots, locale } => {
            let config = RunnerConfig::load(bots, locale)?;
            handle_check(&config)
        }
    }
}

/// Runs until Ctrl-C (or SIGTERM on unix). A fatal config error is logged and returned (non-zero exit).
async fn handle_run(config: RunnerConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn(forward_shutdown_signal(shutdown.clone()));

    match run(config, shutdown).await {
        Ok(summary) => {
            info!(
                started = summary.started.len(),
                failed_to_start = summary.failed_to_start.len(),
                stopped = summary.stopped.len(),
                failed_to_stop = summary.failed_to_stop.len(),
                "gatebot exited"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Fatal configuration error, exiting");
            Err(e)
        }
    }
}

async fn forward_shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                let ctrl_c_error = tokio::select! {
                    result = tokio::signal::ctrl_c() => result.err(),
                    _ = term.recv() => None,
                };
                if let Some(e) = ctrl_c_error {
                    warn!(error = %e, "Cannot listen for Ctrl-C, waiting for SIGTERM");
                    term.recv().await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM, Ctrl-C only");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    wait_for_ctrl_c().await;

    info!("Shutdown signal received");
    shutdown.cancel();
}

async fn wait_for_ctrl_c() {
    resolve_on_signal(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A listener that failed to install never resolves, so the bots keep running.
async fn resolve_on_signal(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        error!(error = %e, "Cannot listen for Ctrl-C, shutdown signal disabled");
        std::future::pending::<()>().await;
    }
}

/// Prints the sessions that would start and the excluded entries. Fails like `run` would.
fn handle_check(config: &RunnerConfig) -> Result<()> {
    let texts = config.texts()?;
    let raw = config.credentials()?;
    let validated = validate_credentials(&raw);

    println!("Bots file: {}", config.bots_file.display());
    println!("Locale file: {} (gate button: {:?})", config.locale_file.display(), texts.gate_button);
    println!("Log channel: {:?}", config.channels.log_channel);
    println!("Auth channel: {:?}", config.channels.auth_channel);
    println!();
    println!("{:<6} {:<24} {}", "index", "session", "status");
    println!("{}", "-".repeat(60));

    let mut valid = validated.valid.iter();
    let mut excluded = validated.excluded.iter().peekable();
    for index in 0..raw.len() {
        match excluded.peek() {
            Some(e) if e.index == index => {
                println!("{:<6} {:<24} excluded: {}", index, e.session_name, e.reason);
                excluded.next();
            }
            _ => {
                if let Some(cred) = valid.next() {
                    println!("{:<6} {:<24} ok", index, cred.session_name);
                }
            }
        }
    }

    if validated.valid.is_empty() {
        anyhow::bail!("No valid bot credentials after filtering");
    }
    println!();
    println!("{} of {} bot(s) would start.", validated.valid.len(), raw.len());
    Ok(())
}
