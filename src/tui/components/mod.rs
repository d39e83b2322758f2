//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as parameters:
//! - `MessageView`: Individual conversation message rendering
//! - `EmptyState`: Centered card shown while the conversation is empty
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: Single-line text input with disabled/placeholder states
//! - `MessageList`: Scrollable conversation view with layout caching
//!
//! ## Design Philosophy
//!
//! Components compose naturally: `MessageList` renders multiple
//! `MessageView` components. External data arrives as props (function
//! parameters), never via global state, so every component is testable
//! with `TestBackend` alone. Each component file contains its state
//! types, event types, rendering logic, and tests.

pub mod input_box;
pub mod message;
pub mod message_list;
pub mod placeholder;

pub use input_box::{InputBox, InputEvent};
pub use message::MessageView;
pub use message_list::{MessageList, MessageListState};
pub use placeholder::EmptyState;
