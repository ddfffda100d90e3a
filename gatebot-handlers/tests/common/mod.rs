//! Recording [`BotClient`] for handler tests. Nothing touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use gatebot_core::{
    BotClient, BotIdentity, ChatKind, GatebotError, InboundMessage, MembershipStatus, MessageId,
    ReplyMarkup, Result, Sender,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded `send_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub chat_id: i64,
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

/// How `get_chat_member` answers.
#[derive(Debug, Clone)]
pub enum Membership {
    Status(MembershipStatus),
    Error(String),
}

pub struct MockClient {
    membership: Membership,
    invite_link: Option<String>,
    fail_send: bool,
    fail_forward: bool,
    pub sent: Mutex<Vec<SentText>>,
    pub forwarded: Mutex<Vec<(MessageId, i64)>>,
    pub lookups: AtomicUsize,
    pub link_lookups: AtomicUsize,
}

impl MockClient {
    pub fn new(membership: Membership) -> Self {
        Self {
            membership,
            invite_link: Some("https://t.me/+invite".to_string()),
            fail_send: false,
            fail_forward: false,
            sent: Mutex::new(Vec::new()),
            forwarded: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            link_lookups: AtomicUsize::new(0),
        }
    }

    pub fn member(status: MembershipStatus) -> Self {
        Self::new(Membership::Status(status))
    }

    pub fn without_invite_link(mut self) -> Self {
        self.invite_link = None;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn failing_forward(mut self) -> Self {
        self.fail_forward = true;
        self
    }

    pub fn sent(&self) -> Vec<SentText> {
        self.sent.lock().unwrap().clone()
    }

    pub fn forwarded(&self) -> Vec<(MessageId, i64)> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn link_lookups(&self) -> usize {
        self.link_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotClient for MockClient {
    async fn connect(&self) -> Result<BotIdentity> {
        Ok(BotIdentity {
            id: 1,
            username: Some("mock_bot".to_string()),
        })
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn poll_updates(&self) -> Result<Vec<InboundMessage>> {
        Ok(Vec::new())
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&ReplyMarkup>,
    ) -> Result<MessageId> {
        if self.fail_send {
            return Err(GatebotError::Send("bot was blocked by the user".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentText {
            chat_id,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(sent.len() as MessageId)
    }

    async fn forward_message(
        &self,
        message: &InboundMessage,
        destination_chat_id: i64,
    ) -> Result<MessageId> {
        if self.fail_forward {
            return Err(GatebotError::Forward("chat not found".to_string()));
        }
        let mut forwarded = self.forwarded.lock().unwrap();
        forwarded.push((message.id, destination_chat_id));
        Ok(1000 + forwarded.len() as MessageId)
    }

    async fn get_chat_member(&self, _channel_id: i64, _user_id: i64) -> Result<MembershipStatus> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match &self.membership {
            Membership::Status(status) => Ok(*status),
            Membership::Error(e) => Err(GatebotError::Lookup(e.clone())),
        }
    }

    async fn export_invite_link(&self, _channel_id: i64) -> Result<String> {
        self.link_lookups.fetch_add(1, Ordering::SeqCst);
        self.invite_link
            .clone()
            .ok_or_else(|| GatebotError::Lookup("not enough rights".to_string()))
    }
}

pub fn private_message(user_id: i64, text: Option<&str>) -> InboundMessage {
    InboundMessage {
        id: 42,
        chat_id: user_id,
        chat_kind: ChatKind::Private,
        text: text.map(str::to_string),
        sender: Sender {
            id: user_id,
            display_name: "Ann".to_string(),
            username: Some("ann".to_string()),
        },
        date: Utc::now(),
    }
}

/// Collects formatted log output for the current thread while the returned guard lives.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
