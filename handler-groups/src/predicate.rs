//! Message predicates used to route messages inside a handler group.

use gatebot_core::InboundMessage;

/// Closed set of predicates a route can be registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Text is the command `/name` (an `@botname` suffix and arguments are allowed).
    Command(String),
    /// Message arrived in a private chat.
    PrivateChat,
    /// Text present, not a command, in a private chat.
    NonCommandText,
    /// Matches every message.
    All,
    /// Matches when every inner predicate matches.
    AllOf(Vec<Predicate>),
}

impl Predicate {
    pub fn command(name: impl Into<String>) -> Self {
        Predicate::Command(name.into())
    }

    /// `/name` sent in a private chat.
    pub fn private_command(name: impl Into<String>) -> Self {
        Predicate::AllOf(vec![Predicate::command(name), Predicate::PrivateChat])
    }

    pub fn matches(&self, message: &InboundMessage) -> bool {
        match self {
            Predicate::Command(name) => message.command_name() == Some(name.as_str()),
            Predicate::PrivateChat => message.is_private(),
            Predicate::NonCommandText => {
                message.text().is_some() && !message.is_command() && message.is_private()
            }
            Predicate::All => true,
            Predicate::AllOf(inner) => inner.iter().all(|p| p.matches(message)),
        }
    }
}
