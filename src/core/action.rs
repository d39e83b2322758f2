//! # Actions
//!
//! Everything that can happen in Parley becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! Backend streams a part? That's `Action::Stream(event)`.
//!
//! The `update()` function takes the current state and an action,
//! then mutates the state and returns an `Effect` for the caller to
//! perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes everything testable: submit a message, feed in a stream
//! fixture, assert on the resulting conversation.

use log::{debug, error, warn};
use serde_json::Value;

use crate::chat::{ChatStatus, StreamEvent};
use crate::core::state::App;

/// Everything that can happen in the app.
#[derive(Debug)]
pub enum Action {
    /// User submitted text from the input box.
    Submit(String),
    /// The backend streamed an event for the in-flight request.
    Stream(StreamEvent),
    /// The request failed before or during streaming (transport error).
    StreamFailed(String),
    /// The streaming task finished without an explicit `finish` event.
    StreamClosed,
    Quit,
}

/// Side effects the caller must perform after an update.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Spawn a backend request for the current conversation.
    SpawnRequest,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,

        Action::Submit(text) => {
            // The input box is disabled while not ready, but a queued
            // event can still race in, so drop it here too.
            if !app.status.is_ready() {
                debug!("Ignoring submit while status={}", app.status.label());
                return Effect::None;
            }
            let text = text.trim().to_string();
            if text.is_empty() {
                return Effect::None;
            }
            app.conversation.push_user(text);
            app.status = ChatStatus::Submitted;
            app.last_error = None;
            Effect::SpawnRequest
        }

        Action::Stream(event) => {
            apply_stream_event(app, event);
            Effect::None
        }

        Action::StreamFailed(message) => {
            // The only error path: log it and flip the status. There is
            // no retry and no user-facing message beyond the title bar.
            error!("Chat request failed: {message}");
            app.last_error = Some(message);
            app.status = ChatStatus::Error;
            Effect::None
        }

        Action::StreamClosed => {
            if app.status != ChatStatus::Error {
                app.status = ChatStatus::Ready;
            }
            Effect::None
        }
    }
}

fn apply_stream_event(app: &mut App, event: StreamEvent) {
    match event {
        StreamEvent::Start { message_id } => {
            app.status = ChatStatus::Streaming;
            app.conversation.begin_assistant(message_id);
        }
        StreamEvent::TextStart { .. } => {
            app.conversation.open_text_part();
        }
        StreamEvent::TextDelta { delta, .. } => {
            app.conversation.append_text(&delta);
        }
        StreamEvent::TextEnd { .. } => {}
        StreamEvent::ToolInputStart {
            tool_call_id,
            tool_name,
        } => {
            // Placeholder part; the full input arrives with
            // tool-input-available and replaces the null.
            app.conversation
                .record_tool_input(tool_name, tool_call_id, Value::Null);
        }
        StreamEvent::ToolInputDelta { tool_call_id } => {
            debug!("Input delta for call {tool_call_id}");
        }
        StreamEvent::ToolInputAvailable {
            tool_call_id,
            tool_name,
            input,
        } => {
            app.conversation
                .record_tool_input(tool_name, tool_call_id, input);
        }
        StreamEvent::ToolOutputAvailable {
            tool_call_id,
            output,
        } => {
            if !app.conversation.record_tool_output(&tool_call_id, output) {
                warn!("Tool output for unknown call id {tool_call_id}, dropping");
            }
        }
        StreamEvent::Data { name, data } => {
            app.conversation.record_data(&name, data);
        }
        StreamEvent::Error { error_text } => {
            error!("Backend reported error: {error_text}");
            app.last_error = Some(error_text);
            app.status = ChatStatus::Error;
        }
        StreamEvent::StartStep | StreamEvent::FinishStep => {}
        StreamEvent::Finish => {
            if app.status != ChatStatus::Error {
                app.status = ChatStatus::Ready;
            }
        }
    }
}
