//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::chat::{BackendError, ChatBackend, ChatRequest, StreamEvent};

/// A no-op backend for tests that don't need real HTTP calls.
pub struct NoopBackend;

#[async_trait]
impl ChatBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn stream_chat(
        &self,
        _request: ChatRequest<'_>,
        _sender: Sender<StreamEvent>,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Creates a test App with a NoopBackend.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(NoopBackend))
}
