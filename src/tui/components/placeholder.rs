//! # Empty State Component
//!
//! Shown in place of the message list while the conversation is empty:
//! a small centered card naming the app and suggesting a first prompt.

use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct EmptyState<'a> {
    /// Suggested first prompt, from config
    pub suggestion: &'a str,
}

impl<'a> EmptyState<'a> {
    pub fn new(suggestion: &'a str) -> Self {
        Self { suggestion }
    }
}

impl<'a> Component for EmptyState<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        use ratatui::layout::{Constraint, Flex, Layout};
        use ratatui::text::{Line, Span};

        let mut text_lines = Vec::new();

        text_lines.push(Line::from(Span::styled(
            "Parley",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )));

        let version_text = format!("v{}", env!("CARGO_PKG_VERSION"));
        text_lines.push(Line::from(Span::styled(
            version_text,
            Style::default().fg(Color::DarkGray),
        )));

        text_lines.push(Line::default());
        text_lines.push(Line::from(Span::styled(
            "Type a message below to start, for example:",
            Style::default().fg(Color::DarkGray),
        )));
        text_lines.push(Line::from(Span::styled(
            format!("\u{201c}{}\u{201d}", self.suggestion),
            Style::default().fg(Color::Green),
        )));

        let text_height = text_lines.len() as u16;
        let vertical_layout = Layout::vertical([Constraint::Length(text_height)])
            .flex(Flex::Center)
            .split(area);

        let paragraph = Paragraph::new(text_lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, vertical_layout[0]);
    }
}
