pub mod backend;
pub mod datastream;
pub mod stream;
pub mod types;

pub use backend::{BackendError, ChatBackend, ChatRequest};
pub use datastream::DataStreamBackend;
pub use stream::StreamEvent;
pub use types::{ChatStatus, Conversation, Message, Part, Role, ToolInvocation, is_truthy};
