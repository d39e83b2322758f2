//! HTTP client for the chat backend's data-stream protocol.
//!
//! The backend exposes `POST /api/chat`, takes the full message history,
//! and answers with an SSE body: one `data: {json}` line per stream part,
//! terminated by `data: [DONE]`. This module owns the transport and the
//! line-level SSE framing; decoding individual parts lives in
//! [`StreamEvent::parse`].

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::mpsc::Sender;

use super::backend::{BackendError, ChatBackend, ChatRequest};
use super::stream::StreamEvent;
use super::types::Message;

/// Request body for `POST /api/chat`.
#[derive(Serialize, Debug)]
struct ChatRequestBody<'a> {
    id: &'a str,
    messages: &'a [Message],
    trigger: &'static str,
}

/// Chat backend speaking the SSE data-stream protocol.
pub struct DataStreamBackend {
    base_url: String,
    client: reqwest::Client,
}

impl DataStreamBackend {
    /// Creates a new backend client.
    ///
    /// # Arguments
    /// * `base_url` - Backend origin, e.g. `http://localhost:8000`
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sends the chat request and returns the streaming response.
    async fn send_request(
        &self,
        body: &ChatRequestBody<'_>,
    ) -> Result<reqwest::Response, BackendError> {
        let json_body = serde_json::to_string(body)
            .map_err(|e| BackendError::Parse(format!("request serialization failed: {e}")))?;
        debug!("Chat request body: {} bytes", json_body.len());

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .query(&[("protocol", "data")])
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        debug!("Chat response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Chat backend error: {} - {}", status, err_body);
            return Err(BackendError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for DataStreamBackend {
    fn name(&self) -> &str {
        "datastream"
    }

    async fn stream_chat(
        &self,
        request: ChatRequest<'_>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), BackendError> {
        let body = ChatRequestBody {
            id: request.conversation_id,
            messages: request.messages,
            trigger: "submit-message",
        };

        info!(
            "Chat request: conversation={}, messages={}",
            request.conversation_id,
            request.messages.len()
        );

        let response = self.send_request(&body).await?;

        let mut buffer = String::new();
        let mut event_count = 0usize;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BackendError::Network(e.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete lines from buffer
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].to_string();
                buffer.drain(..pos + 1);

                let line = line.trim();
                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };

                if data == "[DONE]" {
                    info!("Stream terminated: {} events", event_count);
                    return Ok(());
                }

                // Malformed payloads are absorbed, not fatal: the stream
                // keeps going and the bad part simply never renders.
                match StreamEvent::parse(data) {
                    Ok(Some(event)) => {
                        event_count += 1;
                        debug!("Stream event: {:?}", event);
                        if sender.send(event).await.is_err() {
                            warn!("Event send failed: receiver dropped");
                            return Err(BackendError::ChannelClosed);
                        }
                    }
                    Ok(None) => {
                        debug!("Skipping unhandled stream part: {} bytes", data.len());
                    }
                    Err(e) => {
                        warn!("Dropping malformed stream part: {e}");
                    }
                }
            }
        }

        // Body ended without a [DONE] marker; treat like a normal close.
        info!("Stream ended without terminator: {} events", event_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::{Part, Role};

    #[test]
    fn request_body_shape_matches_backend() {
        let messages = vec![Message {
            id: "m1".to_string(),
            role: Role::User,
            parts: vec![Part::text("hello")],
        }];
        let body = ChatRequestBody {
            id: "conv_1",
            messages: &messages,
            trigger: "submit-message",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["id"], "conv_1");
        assert_eq!(value["trigger"], "submit-message");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["parts"][0]["type"], "text");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let backend = DataStreamBackend::new("http://localhost:8000/".to_string());
        assert_eq!(backend.base_url, "http://localhost:8000");
    }
}
