use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatebotError {
    /// Fatal: no usable credentials or missing configuration/translation data.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Connect error: {0}")]
    Connect(String),

    #[error("Stop error: {0}")]
    Stop(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Forward error: {0}")]
    Forward(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No text in message")]
    NoText,

    #[error("Session is not connected")]
    NotConnected,

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl GatebotError {
    /// Fatal errors end the process; everything else is contained at the session or message boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatebotError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, GatebotError>;
