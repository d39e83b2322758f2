//! # InputBox Component
//!
//! Single-line text entry at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture text input
//! - Handle editing (backspace, cursor movement, paste)
//! - Handle submission (Enter)
//! - Show a placeholder prompt while the buffer is empty
//! - Refuse all editing while disabled (a request is in flight)
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `enabled` and `placeholder`
//! are props set by the parent each frame from the application state.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    /// Text content changed (optional, if parent needs to know)
    ContentChanged,
}

/// Single-line text input component.
///
/// # Props
///
/// - `enabled`: Whether input is accepted (false while a request runs)
/// - `placeholder`: Prompt shown dimmed while the buffer is empty
/// - `status_label`: Shown in the title while disabled
///
/// # State
///
/// - `buffer`: Current text being typed
/// - `cursor_pos`: Byte offset of the cursor within the buffer
pub struct InputBox {
    /// Text buffer (internal state)
    pub buffer: String,
    /// Whether input is currently accepted (prop)
    pub enabled: bool,
    /// Placeholder prompt for the empty buffer (prop)
    pub placeholder: String,
    /// Status label shown while disabled (prop)
    pub status_label: &'static str,
    /// Byte offset of the cursor within the buffer
    cursor_pos: usize,
    /// Horizontal scroll so the cursor stays visible in narrow terminals
    scroll_offset: u16,
}

fn prev_char_boundary(s: &str, pos: usize) -> usize {
    s[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(s: &str, pos: usize) -> usize {
    s[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(s.len())
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            enabled: true,
            placeholder: String::new(),
            status_label: "ready",
            cursor_pos: 0,
            scroll_offset: 0,
        }
    }

    /// Fixed height: one content line plus borders.
    pub const HEIGHT: u16 = 3;

    /// Display column of the cursor within the buffer (before scrolling).
    fn cursor_column(&self) -> u16 {
        self.buffer[..self.cursor_pos].width() as u16
    }

    /// Keep the cursor inside the visible window of a narrow input.
    fn update_scroll(&mut self, content_width: u16) {
        if content_width == 0 {
            return;
        }
        let col = self.cursor_column();
        if col < self.scroll_offset {
            self.scroll_offset = col;
        } else if col >= self.scroll_offset + content_width {
            self.scroll_offset = col.saturating_sub(content_width - 1);
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(2); // borders
        self.update_scroll(content_width);

        let title = if self.enabled {
            "Input".to_string()
        } else {
            format!("Input ({})", self.status_label)
        };

        let text_style = if !self.enabled {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else if self.buffer.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };

        let border_style = if self.enabled {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let text = if self.buffer.is_empty() && self.enabled {
            self.placeholder.clone()
        } else {
            self.buffer.clone()
        };

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let input = Paragraph::new(text)
            .block(block)
            .style(text_style)
            .scroll((0, self.scroll_offset));

        frame.render_widget(input, area);

        // Terminal cursor only while typing is possible
        if self.enabled {
            let x = area.x + 1 + self.cursor_column().saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        // While a request is in flight the box is inert, matching the
        // rendered disabled style.
        if !self.enabled {
            return None;
        }

        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor_pos, *c);
                self.cursor_pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line input: flatten pasted newlines to spaces
                let flat = text.replace(['\n', '\r'], " ");
                self.buffer.insert_str(self.cursor_pos, &flat);
                self.cursor_pos += flat.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor_pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor_pos);
                    self.buffer.drain(prev..self.cursor_pos);
                    self.cursor_pos = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor_pos > 0 {
                    self.cursor_pos = prev_char_boundary(&self.buffer, self.cursor_pos);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor_pos < self.buffer.len() {
                    self.cursor_pos = next_char_boundary(&self.buffer, self.cursor_pos);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorHome => (self.cursor_pos != 0).then(|| {
                self.cursor_pos = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor_pos != self.buffer.len()).then(|| {
                self.cursor_pos = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if !self.buffer.trim().is_empty() {
                    let text = std::mem::take(&mut self.buffer);
                    self.cursor_pos = 0;
                    self.scroll_offset = 0;
                    Some(InputEvent::Submit(text))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
