//! Streamed events emitted by the chat backend.
//!
//! The backend streams one JSON object per SSE `data:` line, tagged by a
//! `type` field: message lifecycle (`start`, `finish`), text parts
//! (`text-start` / `text-delta` / `text-end`), tool parts
//! (`tool-input-start` / `tool-input-delta` / `tool-input-available` /
//! `tool-output-available`), arbitrary data parts (`data-<name>`), step
//! markers, and `error`. Types this client does not render parse to
//! `None` and are skipped.

use serde::Deserialize;
use serde_json::Value;

/// A decoded stream event. One-to-one with the wire tags the client
/// consumes; the `Stream` action in the core reducer applies these to the
/// conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Start { message_id: String },
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    ToolInputStart { tool_call_id: String, tool_name: String },
    ToolInputDelta { tool_call_id: String },
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        input: Value,
    },
    ToolOutputAvailable { tool_call_id: String, output: Value },
    Data { name: String, data: Value },
    Error { error_text: String },
    StartStep,
    FinishStep,
    Finish,
}

// Per-event payload shapes. The wire uses camelCase field names.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPayload {
    message_id: String,
}

#[derive(Deserialize)]
struct TextPayload {
    id: String,
    #[serde(default)]
    delta: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolInputStartPayload {
    tool_call_id: String,
    tool_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolInputDeltaPayload {
    tool_call_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolInputAvailablePayload {
    tool_call_id: String,
    tool_name: String,
    input: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolOutputAvailablePayload {
    tool_call_id: String,
    output: Value,
}

#[derive(Deserialize)]
struct DataPayload {
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    error_text: String,
}

impl StreamEvent {
    /// Decodes one SSE data payload. `Ok(None)` means the type is not one
    /// this client handles, so the caller skips it.
    pub fn parse(data: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
        let value: Value = serde_json::from_str(data)?;
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();

        let event = match kind {
            "start" => {
                let p: StartPayload = serde_json::from_value(value)?;
                StreamEvent::Start {
                    message_id: p.message_id,
                }
            }
            "text-start" => {
                let p: TextPayload = serde_json::from_value(value)?;
                StreamEvent::TextStart { id: p.id }
            }
            "text-delta" => {
                let p: TextPayload = serde_json::from_value(value)?;
                StreamEvent::TextDelta {
                    id: p.id,
                    delta: p.delta,
                }
            }
            "text-end" => {
                let p: TextPayload = serde_json::from_value(value)?;
                StreamEvent::TextEnd { id: p.id }
            }
            "tool-input-start" => {
                let p: ToolInputStartPayload = serde_json::from_value(value)?;
                StreamEvent::ToolInputStart {
                    tool_call_id: p.tool_call_id,
                    tool_name: p.tool_name,
                }
            }
            "tool-input-delta" => {
                // Deltas are informational only; the full input arrives
                // with tool-input-available.
                let p: ToolInputDeltaPayload = serde_json::from_value(value)?;
                StreamEvent::ToolInputDelta {
                    tool_call_id: p.tool_call_id,
                }
            }
            "tool-input-available" => {
                let p: ToolInputAvailablePayload = serde_json::from_value(value)?;
                StreamEvent::ToolInputAvailable {
                    tool_call_id: p.tool_call_id,
                    tool_name: p.tool_name,
                    input: p.input,
                }
            }
            "tool-output-available" => {
                let p: ToolOutputAvailablePayload = serde_json::from_value(value)?;
                StreamEvent::ToolOutputAvailable {
                    tool_call_id: p.tool_call_id,
                    output: p.output,
                }
            }
            "error" => {
                let p: ErrorPayload = serde_json::from_value(value)?;
                StreamEvent::Error {
                    error_text: p.error_text,
                }
            }
            "start-step" => StreamEvent::StartStep,
            "finish-step" => StreamEvent::FinishStep,
            "finish" => StreamEvent::Finish,
            other => {
                // Data parts carry their name in the tag: "data-<name>".
                if let Some(name) = other.strip_prefix("data-") {
                    let name = name.to_string();
                    let p: DataPayload = serde_json::from_value(value)?;
                    StreamEvent::Data { name, data: p.data }
                } else {
                    return Ok(None);
                }
            }
        };

        Ok(Some(event))
    }
}
