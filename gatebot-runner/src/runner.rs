//! [`MultiSessionRunner`]: builds one session per valid credential, starts them all concurrently,
//! idles until the shutdown token fires, then stops every connected session concurrently.
//!
//! State machine: Idle -> Initializing -> Running -> Draining -> Stopped. The only fatal condition is
//! an empty valid-credential set during initialization.

use futures::future::join_all;
use gatebot_core::{ClientFactory, GatebotError, Result};
use gatebot_handlers::{standard_dispatcher, Channels, Texts};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::credentials::{validate_credentials, Excluded, RawCredential};
use crate::session::{ClientSession, DEFAULT_POLL_RETRY_DELAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Initializing,
    Running,
    Draining,
    Stopped,
}

/// A session that failed to build, start or stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub session: String,
    pub error: String,
}

/// What happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub started: Vec<String>,
    pub failed_to_start: Vec<SessionFailure>,
    pub stopped: Vec<String>,
    pub failed_to_stop: Vec<SessionFailure>,
}

pub struct MultiSessionRunner {
    state: RunnerState,
    sessions: Vec<ClientSession>,
    excluded: Vec<Excluded>,
    build_failures: Vec<SessionFailure>,
    valid_count: usize,
    summary: RunSummary,
    retry_delay: Duration,
}

impl Default for MultiSessionRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSessionRunner {
    pub fn new() -> Self {
        Self {
            state: RunnerState::Idle,
            sessions: Vec::new(),
            excluded: Vec::new(),
            build_failures: Vec::new(),
            valid_count: 0,
            summary: RunSummary::default(),
            retry_delay: DEFAULT_POLL_RETRY_DELAY,
        }
    }

    /// Delay between failed polls for sessions built after this call.
    pub fn with_poll_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Number of credentials that passed validation.
    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    pub fn excluded(&self) -> &[Excluded] {
        &self.excluded
    }

    pub fn sessions(&self) -> &[ClientSession] {
        &self.sessions
    }

    /// Names of sessions currently connected.
    pub fn connected(&self) -> Vec<&str> {
        self.sessions
            .iter()
            .filter(|s| s.is_connected())
            .map(|s| s.name())
            .collect()
    }

    /// Validates `raw` and builds a session with the standard handler set for every valid entry.
    ///
    /// Fails with a config error, leaving the runner Stopped, when no entry is valid. A client that
    /// cannot be built is recorded as a start failure; its siblings are unaffected.
    #[instrument(skip_all, fields(entries = raw.len()))]
    pub fn initialize(
        &mut self,
        raw: &[RawCredential],
        factory: &dyn ClientFactory,
        channels: &Channels,
        texts: &Texts,
    ) -> Result<()> {
        if self.state != RunnerState::Idle {
            return Err(GatebotError::Config(format!(
                "Runner already initialized (state {:?})",
                self.state
            )));
        }
        self.state = RunnerState::Initializing;

        let validated = validate_credentials(raw);
        self.valid_count = validated.valid.len();
        self.excluded = validated.excluded;

        if validated.valid.is_empty() {
            self.state = RunnerState::Stopped;
            error!(
                entries = raw.len(),
                excluded = self.excluded.len(),
                "No valid bot credentials"
            );
            return Err(GatebotError::Config(
                "No valid bot credentials after filtering".to_string(),
            ));
        }

        if !channels.log_channel.is_set() {
            warn!("LOG_CHANNEL_ID not set, messages will not be forwarded");
        }

        for credential in validated.valid {
            let client = match factory.build(&credential) {
                Ok(client) => client,
                Err(e) => {
                    error!(session = %credential.session_name, error = %e, "Failed to build client");
                    self.build_failures.push(SessionFailure {
                        session: credential.session_name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            let dispatcher =
                standard_dispatcher(&credential.session_name, client.clone(), channels, texts);
            self.sessions.push(
                ClientSession::new(credential, client, dispatcher).with_retry_delay(self.retry_delay),
            );
        }

        info!(
            valid = self.valid_count,
            excluded = self.excluded.len(),
            sessions = self.sessions.len(),
            "Runner initialized"
        );
        Ok(())
    }

    /// Starts every session concurrently; failures are recorded, never retried.
    #[instrument(skip(self))]
    pub async fn start_all(&mut self) {
        if self.state != RunnerState::Initializing {
            warn!(state = ?self.state, "start_all called outside Initializing");
            return;
        }
        self.state = RunnerState::Running;
        self.summary.failed_to_start.append(&mut self.build_failures);

        let results = join_all(self.sessions.iter_mut().map(|s| async move {
            let result = s.start().await;
            (s.name().to_string(), result)
        }))
        .await;

        for (session, result) in results {
            match result {
                Ok(_) => self.summary.started.push(session),
                Err(e) => {
                    error!(session = %session, error = %e, "Session failed to start");
                    self.summary.failed_to_start.push(SessionFailure {
                        session,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            started = self.summary.started.len(),
            failed = self.summary.failed_to_start.len(),
            "All sessions attempted"
        );
    }

    /// Stops every connected session concurrently, exactly once each; failures are logged and recorded.
    #[instrument(skip(self))]
    pub async fn stop_all(&mut self) {
        if self.state != RunnerState::Running {
            warn!(state = ?self.state, "stop_all called outside Running");
            return;
        }
        self.state = RunnerState::Draining;

        let results = join_all(
            self.sessions
                .iter_mut()
                .filter(|s| s.is_connected())
                .map(|s| async move {
                    let result = s.stop().await;
                    (s.name().to_string(), result)
                }),
        )
        .await;

        for (session, result) in results {
            match result {
                Ok(()) => self.summary.stopped.push(session),
                Err(e) => {
                    error!(session = %session, error = %e, "Session failed to stop");
                    self.summary.failed_to_stop.push(SessionFailure {
                        session,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.state = RunnerState::Stopped;
        info!(
            stopped = self.summary.stopped.len(),
            failed = self.summary.failed_to_stop.len(),
            "Runner stopped"
        );
    }

    /// Starts all sessions, waits for `shutdown` (no timeout), then drains.
    pub async fn run_until(&mut self, shutdown: CancellationToken) -> RunSummary {
        self.start_all().await;
        if self.state == RunnerState::Running {
            info!(connected = ?self.connected(), "Running until shutdown signal");
            shutdown.cancelled().await;
            info!("Shutdown signal received");
            self.stop_all().await;
        }
        self.summary.clone()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}
