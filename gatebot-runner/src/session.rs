//! [`ClientSession`]: one bot's connection, its polling task and its dispatcher.

use gatebot_core::{BotClient, BotCredential, BotIdentity, GatebotError, Result};
use handler_groups::Dispatcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// Delay before polling again after a failed poll.
pub const DEFAULT_POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

struct Running {
    identity: BotIdentity,
    cancel: CancellationToken,
    poller: JoinHandle<()>,
    in_flight: TaskTracker,
}

/// A session owned by the runner. Inbound messages are delivered to the dispatcher from a
/// background task between [`ClientSession::start`] and [`ClientSession::stop`].
pub struct ClientSession {
    credential: BotCredential,
    client: Arc<dyn BotClient>,
    dispatcher: Arc<Dispatcher>,
    retry_delay: Duration,
    running: Option<Running>,
}

impl ClientSession {
    pub fn new(credential: BotCredential, client: Arc<dyn BotClient>, dispatcher: Dispatcher) -> Self {
        Self {
            credential,
            client,
            dispatcher: Arc::new(dispatcher),
            retry_delay: DEFAULT_POLL_RETRY_DELAY,
            running: None,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn name(&self) -> &str {
        &self.credential.session_name
    }

    pub fn credential(&self) -> &BotCredential {
        &self.credential
    }

    pub fn is_connected(&self) -> bool {
        self.running.is_some()
    }

    pub fn identity(&self) -> Option<&BotIdentity> {
        self.running.as_ref().map(|r| &r.identity)
    }

    /// Connects and starts delivering messages. Starting a connected session returns its identity again.
    #[instrument(skip(self), fields(session = %self.credential.session_name))]
    pub async fn start(&mut self) -> Result<BotIdentity> {
        if let Some(running) = &self.running {
            return Ok(running.identity.clone());
        }

        let identity = self.client.connect().await?;
        let cancel = CancellationToken::new();
        let in_flight = TaskTracker::new();
        let poller = tokio::spawn(poll_loop(
            self.credential.session_name.clone(),
            self.client.clone(),
            self.dispatcher.clone(),
            cancel.clone(),
            in_flight.clone(),
            self.retry_delay,
        ));

        info!(bot_id = identity.id, username = ?identity.username, "Session started");
        self.running = Some(Running {
            identity: identity.clone(),
            cancel,
            poller,
            in_flight,
        });
        Ok(identity)
    }

    /// Stops polling, waits for in-flight handlers, then disconnects. No-op when not connected.
    #[instrument(skip(self), fields(session = %self.credential.session_name))]
    pub async fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            debug!("Session not connected, nothing to stop");
            return Ok(());
        };

        running.cancel.cancel();
        if let Err(e) = running.poller.await {
            warn!(error = %e, "Polling task ended abnormally");
        }
        running.in_flight.close();
        running.in_flight.wait().await;

        self.client
            .disconnect()
            .await
            .map_err(|e| GatebotError::Stop(e.to_string()))?;
        info!("Session stopped");
        Ok(())
    }
}

/// Polls until cancelled. Each message is dispatched in its own task, so a slow handler never holds up polling.
async fn poll_loop(
    session: String,
    client: Arc<dyn BotClient>,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
    in_flight: TaskTracker,
    retry_delay: Duration,
) {
    info!(session = %session, "Polling loop started");
    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => break,
            batch = client.poll_updates() => batch,
        };

        match batch {
            Ok(messages) => {
                for message in messages {
                    let dispatcher = dispatcher.clone();
                    let span = info_span!(
                        "message",
                        session = %session,
                        message_id = message.id,
                        user_id = message.sender.id
                    );
                    in_flight.spawn(
                        async move {
                            dispatcher.dispatch(&message).await;
                        }
                        .instrument(span),
                    );
                }
            }
            Err(e) => {
                error!(session = %session, error = %e, "Polling failed, retrying");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(retry_delay) => {}
                }
            }
        }
    }
    info!(session = %session, "Polling loop stopped");
}
