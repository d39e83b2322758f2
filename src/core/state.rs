//! # Application State
//!
//! Core business state for Parley. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>   // streaming chat backend
//! ├── conversation: Conversation      // ordered message history
//! ├── conversation_id: String         // stable id sent with every request
//! ├── status: ChatStatus              // ready / submitted / streaming / error
//! └── last_error: Option<String>      // most recent backend error (log-only)
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;

use uuid::Uuid;

use crate::chat::{ChatBackend, ChatStatus, Conversation};

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub conversation: Conversation,
    pub conversation_id: String,
    pub status: ChatStatus,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            conversation: Conversation::new(),
            conversation_id: Uuid::new_v4().to_string(),
            status: ChatStatus::Ready,
            last_error: None,
        }
    }
}
