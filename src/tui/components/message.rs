//! # Message Component
//!
//! Renders one conversation message as a bordered block: the role label
//! as the title, a collapsible raw-JSON line at the top, then each part
//! in order through the kind dispatch in [`part_lines`].
//!
//! **Collapsed** (raw view closed):
//!   `╭─ assistant ────────────────────────────╮`
//!   `│ ▸ msg_abc123                           │`
//!   `│ The weather in Tokyo is 21°C.          │`
//!   `╰────────────────────────────────────────╯`
//!
//! **Tool part** (output present and truthy):
//!   `│ function: get_current_weather({"location":"Tokyo"}) │`
//!   `│ result:                                             │`
//!   `│   { "temperature": 21 }                             │`
//!
//! Parts with an unrecognized kind produce no lines at all; that is the
//! contract, not an error path.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget};
use serde_json::Value;

use crate::chat::{Message, Part, Role, ToolInvocation, is_truthy};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Max lines for a pretty-printed JSON section (input / result / usage).
const MAX_SECTION_LINES: usize = 12;

const fn tool_style() -> Style {
    Style::new().fg(Color::Yellow)
}
const fn result_style() -> Style {
    Style::new().fg(Color::White)
}
const fn usage_style() -> Style {
    Style::new().fg(Color::Magenta)
}
const fn raw_style() -> Style {
    Style::new().fg(Color::DarkGray)
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

/// A stateless component that renders a single chat message.
///
/// `MessageView` is a transient component: it's created fresh each frame
/// with the data it needs to render. Whether the raw-JSON view is open
/// and whether the block is hovered are passed in from the parent
/// `MessageList`, which tracks both persistently (keyed by message id).
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    /// The message to render
    pub message: &'a Message,
    /// Whether the raw-JSON debug view is open
    pub expanded: bool,
    /// Whether this message is currently under the cursor
    pub is_hovered: bool,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, expanded: bool, is_hovered: bool) -> Self {
        Self {
            message,
            expanded,
            is_hovered,
        }
    }

    /// Calculate the height required for this message given a width.
    ///
    /// Height and rendering both go through [`build_lines`], so the
    /// calculated value always matches what `render` produces. This lets
    /// the parent `MessageList` lay out the scroll canvas without
    /// rendering each message first.
    pub fn calculate_height(message: &Message, expanded: bool, width: u16) -> u16 {
        if width.saturating_sub(HORIZONTAL_OVERHEAD) == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        build_lines(message, expanded, width).len() as u16 + VERTICAL_OVERHEAD
    }
}

impl<'a> Widget for MessageView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let style = role_style(self.message.role);
        let border_style = if self.is_hovered {
            style
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(self.message.role.label())
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = build_lines(self.message, self.expanded, area.width);
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Builds every content line for a message: the raw-JSON summary line,
/// the expanded JSON dump (if open), then each part in order.
pub fn build_lines(message: &Message, expanded: bool, width: u16) -> Vec<Line<'static>> {
    let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
    let mut lines = Vec::new();

    // Collapsible raw view: the collapsed line shows just the message id.
    let marker = if expanded { "▾" } else { "▸" };
    lines.push(Line::from(Span::styled(
        format!("{marker} {}", message.id),
        raw_style(),
    )));
    if expanded {
        let raw = serde_json::to_string_pretty(message)
            .unwrap_or_else(|_| "(unserializable)".to_string());
        for text in raw.lines() {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                raw_style().add_modifier(Modifier::DIM),
            )));
        }
    }

    for part in &message.parts {
        lines.extend(part_lines(part, content_width));
    }

    lines
}

/// The rendering branch for one part, chosen by its kind.
///
/// Unrecognized kinds fall through to no output. The part still exists
/// (visible in the raw-JSON view) but contributes nothing to the block.
fn part_lines(part: &Part, width: usize) -> Vec<Line<'static>> {
    match part {
        Part::Text { text } => text_lines(text, width),
        Part::Tool(tool) => tool_lines(tool, width),
        Part::UsageData { data } => labeled_json("usage:", data, usage_style()),
        Part::Other { .. } => Vec::new(),
    }
}

/// Verbatim text, wrapped to the content width.
fn text_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let options = textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|cow| Line::from(cow.into_owned()))
        .collect()
}

/// The invocation line `function: name(input)`, plus a `result:` block
/// if (and only if) an output is present and truthy.
fn tool_lines(tool: &ToolInvocation, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let compact = format!("function: {}({})", tool.name, tool.input);
    if compact.chars().count() <= width {
        lines.push(Line::from(Span::styled(compact, tool_style())));
    } else {
        // Input too wide for one line: open the call across lines.
        lines.push(Line::from(Span::styled(
            format!("function: {}(", tool.name),
            tool_style(),
        )));
        for text in pretty_json(&tool.input, MAX_SECTION_LINES) {
            lines.push(Line::from(Span::styled(format!("  {text}"), tool_style())));
        }
        lines.push(Line::from(Span::styled(")".to_string(), tool_style())));
    }

    if let Some(output) = &tool.output
        && is_truthy(output)
    {
        lines.extend(labeled_json("result:", output, result_style()));
    }

    lines
}

/// A `label:` line followed by the pretty-printed payload, indented.
fn labeled_json(label: &'static str, value: &Value, style: Style) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(label, style))];
    for text in pretty_json(value, MAX_SECTION_LINES) {
        let line_style = if text.starts_with("… +") {
            style.add_modifier(Modifier::DIM)
        } else {
            style
        };
        lines.push(Line::from(Span::styled(format!("  {text}"), line_style)));
    }
    lines
}

/// Pretty-print a JSON value, capping output at `max_lines`.
fn pretty_json(value: &Value, max_lines: usize) -> Vec<String> {
    let formatted =
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let all_lines: Vec<&str> = formatted.lines().collect();
    let total = all_lines.len();

    if total <= max_lines {
        all_lines.iter().map(|l| l.to_string()).collect()
    } else {
        let take = max_lines - 1;
        let mut result: Vec<String> =
            all_lines[..take].iter().map(|l| l.to_string()).collect();
        result.push(format!("… +{} lines", total - take));
        result
    }
}
