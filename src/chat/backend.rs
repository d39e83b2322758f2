use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::stream::StreamEvent;
use super::types::Message;

/// Errors that can occur while talking to the chat backend.
/// Variants carry enough info to determine retryability (future use).
#[derive(Debug)]
pub enum BackendError {
    /// Backend misconfigured (bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// Backend returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the backend's response. Not retryable.
    Parse(String),
    /// The mpsc channel was closed (UI dropped the receiver). Not retryable.
    ChannelClosed,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Everything the backend needs to continue the conversation: the full
/// message history plus a stable conversation id.
pub struct ChatRequest<'a> {
    pub conversation_id: &'a str,
    pub messages: &'a [Message],
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Streams the next assistant turn, sending decoded events to the
    /// provided channel until the stream terminates.
    async fn stream_chat(
        &self,
        request: ChatRequest<'_>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), BackendError>;
}
