//! Conversation data model: messages, parts, and status.
//!
//! A message is one turn in the conversation; its content is an ordered
//! sequence of tagged parts. Part kinds follow the backend's wire tags:
//! `text`, `tool-<name>`, `data-usage`. Anything else is carried through
//! as [`Part::Other`] and rendered as nothing; unknown kinds are a
//! deliberate no-op, not an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};
use uuid::Uuid;

/// Who authored a message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Display label used as the message block title.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Readiness of the conversation: the input accepts interaction only in
/// `Ready`. `Submitted` covers the window between sending a request and
/// the first streamed event; `Streaming` lasts until the stream finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatStatus {
    #[default]
    Ready,
    Submitted,
    Streaming,
    Error,
}

impl ChatStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, ChatStatus::Ready)
    }

    pub fn label(self) -> &'static str {
        match self {
            ChatStatus::Ready => "ready",
            ChatStatus::Submitted => "submitted",
            ChatStatus::Streaming => "streaming",
            ChatStatus::Error => "error",
        }
    }
}

/// A tool call surfaced in a message: the model asked for `name` to be run
/// with `input`; `output` is filled in once the backend has executed it.
/// Execution happens server-side; the client only renders the pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub call_id: String,
    pub input: Value,
    pub output: Option<Value>,
}

/// One unit of message content, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text { text: String },
    Tool(ToolInvocation),
    UsageData { data: Value },
    /// Unrecognized tag. Kept verbatim (for the raw-JSON view and for
    /// round-tripping back to the backend) but never rendered.
    Other { kind: String, body: Value },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// The wire tag for this part.
    pub fn kind(&self) -> String {
        match self {
            Part::Text { .. } => "text".to_string(),
            Part::Tool(tool) => format!("tool-{}", tool.name),
            Part::UsageData { .. } => "data-usage".to_string(),
            Part::Other { kind, .. } => kind.clone(),
        }
    }

    /// Classify a JSON object by its `type` field. A missing or
    /// non-string `type` classifies as `Other` with an empty kind.
    fn from_value(value: Value) -> Part {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind == "text" {
            return Part::Text {
                text: value
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            };
        }

        // Tool parts carry their tool name inside the tag: "tool-<name>".
        if let Some(name) = kind.strip_prefix("tool-") {
            return Part::Tool(ToolInvocation {
                name: name.to_string(),
                call_id: value
                    .get("toolCallId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                input: value.get("input").cloned().unwrap_or(Value::Null),
                output: value.get("output").cloned(),
            });
        }

        if kind == "data-usage" {
            return Part::UsageData {
                data: value.get("data").cloned().unwrap_or(Value::Null),
            };
        }

        Part::Other { kind, body: value }
    }

    fn to_value(&self) -> Value {
        match self {
            Part::Text { text } => json!({ "type": "text", "text": text }),
            Part::Tool(tool) => {
                let state = if tool.output.is_some() {
                    "output-available"
                } else {
                    "input-available"
                };
                let mut obj = json!({
                    "type": format!("tool-{}", tool.name),
                    "toolCallId": tool.call_id,
                    "state": state,
                    "input": tool.input,
                });
                if let (Some(output), Some(map)) = (&tool.output, obj.as_object_mut()) {
                    map.insert("output".to_string(), output.clone());
                }
                obj
            }
            Part::UsageData { data } => json!({ "type": "data-usage", "data": data }),
            Part::Other { body, .. } => body.clone(),
        }
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Part::from_value(Value::deserialize(deserializer)?))
    }
}

/// One turn in the conversation. Ids are unique and stable; the UI keys
/// hover and expansion state on them across re-renders.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    fn find_tool_mut(&mut self, call_id: &str) -> Option<&mut ToolInvocation> {
        self.parts.iter_mut().find_map(|part| match part {
            Part::Tool(tool) if tool.call_id == call_id => Some(tool),
            _ => None,
        })
    }
}

/// Ordered message history. Owned by the core state; the renderer only
/// ever reads it. Streaming updates mutate the last assistant message in
/// place.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user message with a single text part and returns it.
    pub fn push_user(&mut self, text: String) -> &Message {
        self.messages.push(Message {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            parts: vec![Part::text(text)],
        });
        self.messages.last().expect("just pushed")
    }

    /// Opens a new assistant message for an incoming stream. An empty id
    /// (backend did not send one) gets a locally generated uuid.
    pub fn begin_assistant(&mut self, id: String) {
        let id = if id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };
        self.messages.push(Message {
            id,
            role: Role::Assistant,
            parts: Vec::new(),
        });
    }

    /// The assistant message currently receiving the stream, creating one
    /// if the stream started without a `start` event.
    fn streaming_message(&mut self) -> &mut Message {
        let needs_new = !matches!(
            self.messages.last(),
            Some(msg) if msg.role == Role::Assistant
        );
        if needs_new {
            self.begin_assistant(String::new());
        }
        self.messages.last_mut().expect("assistant message present")
    }

    /// Opens a fresh (empty) text part on the streaming message.
    pub fn open_text_part(&mut self) {
        self.streaming_message().parts.push(Part::text(""));
    }

    /// Appends a delta to the last open text part, opening one if needed.
    pub fn append_text(&mut self, delta: &str) {
        let message = self.streaming_message();
        if let Some(Part::Text { text }) = message.parts.last_mut() {
            text.push_str(delta);
            return;
        }
        message.parts.push(Part::text(delta));
    }

    /// Records a tool invocation on the streaming message. If a part with
    /// the same call id already exists (placeholder from
    /// `tool-input-start`), its name and input are updated in place.
    pub fn record_tool_input(&mut self, name: String, call_id: String, input: Value) {
        let message = self.streaming_message();
        if let Some(tool) = message.find_tool_mut(&call_id) {
            tool.name = name;
            tool.input = input;
            return;
        }
        message.parts.push(Part::Tool(ToolInvocation {
            name,
            call_id,
            input,
            output: None,
        }));
    }

    /// Attaches an output to the invocation with the matching call id,
    /// searching messages from newest to oldest. Returns false if no
    /// invocation matched.
    pub fn record_tool_output(&mut self, call_id: &str, output: Value) -> bool {
        for message in self.messages.iter_mut().rev() {
            if let Some(tool) = message.find_tool_mut(call_id) {
                tool.output = Some(output);
                return true;
            }
        }
        false
    }

    /// Appends a `data-<name>` part to the streaming message. Only
    /// `usage` has a rendering branch; other names are carried as
    /// unrecognized parts and render as nothing.
    pub fn record_data(&mut self, name: &str, data: Value) {
        let part = if name == "usage" {
            Part::UsageData { data }
        } else {
            let kind = format!("data-{name}");
            Part::Other {
                body: json!({ "type": kind, "data": data }),
                kind,
            }
        };
        self.streaming_message().parts.push(part);
    }
}

/// JavaScript truthiness for JSON values. The tool result block is gated
/// on `Boolean(part.output)`: null, false, 0, NaN and "" hide it; arrays
/// and objects (even empty ones) show it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
