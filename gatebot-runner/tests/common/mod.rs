//! Scripted [`BotClient`] and [`ClientFactory`] for runner tests.
//!
//! Each client serves a queue of inbound messages from `poll_updates` (then waits forever), records
//! connects, disconnects, sends and forwards, and can be told to fail connect or disconnect.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use gatebot_core::{
    BotClient, BotCredential, BotIdentity, ChatKind, ClientFactory, GatebotError, InboundMessage,
    MembershipStatus, MessageId, ReplyMarkup, Result, Sender,
};
use gatebot_runner::RawCredential;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, Default)]
pub struct Behaviour {
    pub fail_connect: bool,
    pub fail_disconnect: bool,
    /// Number of initial polls that fail before messages are served.
    pub failing_polls: usize,
    pub inbox: Vec<InboundMessage>,
}

pub struct ScriptedClient {
    pub name: String,
    behaviour: Behaviour,
    inbox: Mutex<VecDeque<InboundMessage>>,
    failing_polls: AtomicUsize,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub polls: AtomicUsize,
    pub sent: Mutex<Vec<(i64, String)>>,
    pub forwarded: Mutex<Vec<(MessageId, i64)>>,
}

impl ScriptedClient {
    fn new(name: &str, behaviour: Behaviour) -> Self {
        Self {
            name: name.to_string(),
            inbox: Mutex::new(behaviour.inbox.iter().cloned().collect()),
            failing_polls: AtomicUsize::new(behaviour.failing_polls),
            behaviour,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            forwarded: Mutex::new(Vec::new()),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn inbox_len(&self) -> usize {
        self.inbox.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn forwarded(&self) -> Vec<(MessageId, i64)> {
        self.forwarded.lock().unwrap().clone()
    }

    /// Waits until every scripted message has been handed to the session.
    pub async fn drained(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.inbox_len() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("inbox not drained in time");
    }
}

#[async_trait]
impl BotClient for ScriptedClient {
    async fn connect(&self) -> Result<BotIdentity> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_connect {
            return Err(GatebotError::Connect(format!("{}: Unauthorized", self.name)));
        }
        Ok(BotIdentity {
            id: 1,
            username: Some(format!("{}_bot", self.name)),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.behaviour.fail_disconnect {
            return Err(GatebotError::Stop(format!("{}: connection reset", self.name)));
        }
        Ok(())
    }

    async fn poll_updates(&self) -> Result<Vec<InboundMessage>> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(GatebotError::Connect("network unreachable".to_string()));
        }
        let batch: Vec<_> = self.inbox.lock().unwrap().drain(..).collect();
        if batch.is_empty() {
            std::future::pending::<()>().await;
        }
        Ok(batch)
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        _markup: Option<&ReplyMarkup>,
    ) -> Result<MessageId> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, text.to_string()));
        Ok(sent.len() as MessageId)
    }

    async fn forward_message(
        &self,
        message: &InboundMessage,
        destination_chat_id: i64,
    ) -> Result<MessageId> {
        let mut forwarded = self.forwarded.lock().unwrap();
        forwarded.push((message.id, destination_chat_id));
        Ok(forwarded.len() as MessageId)
    }

    async fn get_chat_member(&self, _channel_id: i64, _user_id: i64) -> Result<MembershipStatus> {
        Ok(MembershipStatus::Member)
    }

    async fn export_invite_link(&self, _channel_id: i64) -> Result<String> {
        Ok("https://t.me/+invite".to_string())
    }
}

/// Builds [`ScriptedClient`]s by session name and keeps them for inspection.
#[derive(Default)]
pub struct ScriptedFactory {
    behaviours: HashMap<String, Behaviour>,
    fail_build: HashSet<String>,
    built: Mutex<HashMap<String, Arc<ScriptedClient>>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(name.to_string(), behaviour);
        self
    }

    pub fn failing_build(mut self, name: &str) -> Self {
        self.fail_build.insert(name.to_string());
        self
    }

    pub fn client(&self, name: &str) -> Arc<ScriptedClient> {
        self.built
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no client built for {}", name))
    }

    pub fn built_count(&self) -> usize {
        self.built.lock().unwrap().len()
    }
}

impl ClientFactory for ScriptedFactory {
    fn build(&self, credential: &BotCredential) -> Result<Arc<dyn BotClient>> {
        if self.fail_build.contains(&credential.session_name) {
            return Err(GatebotError::Config("invalid api url".to_string()));
        }
        let behaviour = self
            .behaviours
            .get(&credential.session_name)
            .cloned()
            .unwrap_or_default();
        let client = Arc::new(ScriptedClient::new(&credential.session_name, behaviour));
        self.built
            .lock()
            .unwrap()
            .insert(credential.session_name.clone(), client.clone());
        Ok(client)
    }
}

pub fn valid(name: &str) -> RawCredential {
    RawCredential {
        session_name: name.to_string(),
        api_id: serde_json::json!(2040),
        api_hash: "0123456789abcdef".to_string(),
        bot_token: format!("1000:{}-token", name),
    }
}

pub fn placeholder(name: &str) -> RawCredential {
    RawCredential {
        bot_token: "YOUR_BOT_TOKEN".to_string(),
        ..valid(name)
    }
}

pub fn private_message(id: MessageId, user_id: i64, text: Option<&str>) -> InboundMessage {
    InboundMessage {
        id,
        chat_id: user_id,
        chat_kind: ChatKind::Private,
        text: text.map(str::to_string),
        sender: Sender {
            id: user_id,
            display_name: "Ann".to_string(),
            username: None,
        },
        date: Utc::now(),
    }
}
