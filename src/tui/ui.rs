use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::chat::ChatStatus;
use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{EmptyState, InputBox, MessageList};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(InputBox::HEIGHT)]);
    let [title_area, main_area, input_area] = layout.areas(frame.area());

    // Title bar
    frame.render_widget(title_line(app), title_area);

    // Main area: placeholder card until the first message exists
    if app.conversation.is_empty() {
        EmptyState::new(&tui.suggestion).render(frame, main_area);
    } else {
        let is_streaming = matches!(
            app.status,
            ChatStatus::Submitted | ChatStatus::Streaming
        );
        MessageList::new(&mut tui.message_list, &app.conversation, is_streaming)
            .render(frame, main_area);
    }

    // Input area
    tui.input_box.render(frame, input_area);
}

fn title_line(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled("Parley", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" ({})", app.backend.name())),
        Span::raw(" | "),
        Span::styled(app.status.label(), status_style(app.status)),
    ];
    if let Some(error) = &app.last_error {
        spans.push(Span::styled(
            format!(" | {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn status_style(status: ChatStatus) -> Style {
    match status {
        ChatStatus::Ready => Style::default().fg(Color::Green),
        ChatStatus::Submitted | ChatStatus::Streaming => Style::default().fg(Color::Yellow),
        ChatStatus::Error => Style::default().fg(Color::Red),
    }
}

/// Hit test: given a screen Y coordinate, find which message index (if any)
/// is at that position
pub fn hit_test_message(
    screen_y: u16,
    frame_area: Rect,
    scroll_offset_y: u16,
    prefix_heights: &[u16],
) -> Option<usize> {
    use Constraint::{Length, Min};

    // Calculate layout to find main_area
    let layout = Layout::vertical([Length(1), Min(0), Length(InputBox::HEIGHT)]);
    let [_title_area, main_area, _input_area] = layout.areas(frame_area);

    // Check if mouse is within the main content area
    if screen_y < main_area.y || screen_y >= main_area.y + main_area.height {
        return None;
    }

    // Convert screen Y to content Y (accounting for scroll)
    let content_y = (screen_y - main_area.y) + scroll_offset_y;

    let idx = prefix_heights.partition_point(|&end| end <= content_y);
    (idx < prefix_heights.len()).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_ui_empty_conversation_shows_placeholder() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let app = test_app();
        let mut tui = TuiState::new("What's the weather in San Francisco?".to_string());

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Parley"));
        assert!(text.contains("What's the weather"));
    }

    #[test]
    fn test_draw_ui_with_messages_shows_conversation() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        let mut tui = TuiState::new(String::new());

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("hello"));
        assert!(text.contains("submitted"), "status label shown in title");
    }

    #[test]
    fn test_hit_test_message() {
        let frame_area = Rect::new(0, 0, 80, 24);
        // main_area: y=1..21 (title 1 row, input 3 rows)
        let prefix_heights = [4u16, 8, 12];

        // Title bar row misses
        assert_eq!(hit_test_message(0, frame_area, 0, &prefix_heights), None);
        // First message block
        assert_eq!(hit_test_message(1, frame_area, 0, &prefix_heights), Some(0));
        assert_eq!(hit_test_message(4, frame_area, 0, &prefix_heights), Some(0));
        // Second message block
        assert_eq!(hit_test_message(5, frame_area, 0, &prefix_heights), Some(1));
        // Scroll offset shifts the mapping
        assert_eq!(hit_test_message(1, frame_area, 4, &prefix_heights), Some(1));
        // Below all content
        assert_eq!(hit_test_message(15, frame_area, 0, &prefix_heights), None);
        // Input area misses
        assert_eq!(hit_test_message(22, frame_area, 0, &prefix_heights), None);
    }
}
