//! # MessageList Component
//!
//! Scrollable view of the conversation history.
//!
//! ## Responsibilities
//!
//! - Display the message list, one bordered block per message
//! - Manage scrolling specific logic (stick-to-bottom, clamping)
//! - Hit testing support for mouse hover and click-to-expand
//! - Perform efficient layout caching (message heights)
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and `&Conversation` (props).
//!
//! Since `Component::render` takes `&mut self`, we can safely mutate the state
//! (including layout cache and scroll state) during the render pass, aligning
//! with Ratatui's `StatefulWidget` pattern.

use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::chat::{Conversation, Message};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Message index currently under the mouse cursor
    pub hovered_index: Option<usize>,
    /// Ids of messages whose raw-JSON view is open (toggled by click)
    pub expanded_ids: HashSet<String>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            hovered_index: None,
            expanded_ids: HashSet::new(),
            viewport_height: 0,
        }
    }

    /// Toggle the raw-JSON view for a message. Keyed by id rather than
    /// index so the open set survives messages being appended.
    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded_ids.remove(id) {
            self.expanded_ids.insert(id.to_string());
        }
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    /// Prevents overscrolling past the last message.
    pub fn clamp_scroll(&mut self) {
        let total_content_height: u16 = self.layout.heights.iter().sum();
        let max_y = total_content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    /// Called on scroll-down events so that scrolling past the end re-pins to bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let total_content_height: u16 = self.layout.heights.iter().sum();
        let max_y = total_content_height.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    // Mutable reference to persistent state
    pub state: &'a mut MessageListState,
    pub conversation: &'a Conversation,
    /// True while a response is still streaming in
    pub is_streaming: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        conversation: &'a Conversation,
        is_streaming: bool,
    ) -> Self {
        Self {
            state,
            conversation,
            is_streaming,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let messages = &self.conversation.messages;
        let num_messages = messages.len();

        // 1. Update layout cache (internal mutation)
        let expanded_ids = &self.state.expanded_ids;
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(
            messages,
            content_width,
            self.is_streaming,
            expanded_ids,
        );
        layout.heights.truncate(reusable.min(layout.heights.len()));

        for message in messages.iter().skip(layout.heights.len()) {
            let expanded = expanded_ids.contains(&message.id);
            layout
                .heights
                .push(MessageView::calculate_height(message, expanded, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(num_messages, content_width, expanded_ids);

        let total_height: u16 = self.state.layout.heights.iter().sum();

        // 2. Clamp scroll offset to prevent overscrolling past content.
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let message = &messages[i];
            let height = self.state.layout.heights[i];
            let expanded = self.state.expanded_ids.contains(&message.id);
            let is_hovered = self.state.hovered_index == Some(i);

            let message_rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(
                MessageView::new(message, expanded, is_hovered),
                message_rect,
            );

            y_offset += height;
        }

        // Auto-scroll logic (mutation)
        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList` because:
/// 1. Event handling requires persistent state (scroll position, stick_to_bottom flag)
/// 2. `MessageList` is recreated each frame with fresh props, so it can't hold state
/// 3. The state object lives in `TuiState` and persists across the event loop
impl EventHandler for MessageListState {
    type Event = (); // MessageList currently emits no events (scroll handled internally)

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            // Mouse moves handled by parent for now due to hit testing complexity
            _ => None,
        }
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
    /// Tracks which messages are expanded so heights are invalidated on toggle.
    cached_expanded_ids: HashSet<String>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
            cached_expanded_ids: HashSet::new(),
        }
    }

    /// How many cached heights can be trusted as-is for this frame.
    pub fn reusable_count(
        &self,
        messages: &[Message],
        content_width: u16,
        is_streaming: bool,
        expanded_ids: &HashSet<String>,
    ) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }

        // Fewer messages than cached means the conversation was reset -> invalid
        if messages.len() < self.message_count {
            return 0;
        }

        // Expansion state changed: invalidate from the earliest toggled message onward.
        if expanded_ids != &self.cached_expanded_ids {
            let toggled: HashSet<&String> = expanded_ids
                .symmetric_difference(&self.cached_expanded_ids)
                .collect();
            if let Some(earliest) = messages
                .iter()
                .position(|m| toggled.contains(&m.id))
            {
                return earliest;
            }
        }

        // The last message is volatile while a response streams in: deltas
        // mutate its parts in place, so its height must be recalculated.
        // Recheck it once more after streaming flips off, since the final
        // batch of deltas may have landed in the same frame.
        if is_streaming || messages.len() == self.message_count {
            messages.len().saturating_sub(1)
        } else {
            // New messages appended while idle: everything cached is stable.
            self.message_count
        }
    }

    pub fn update_metadata(
        &mut self,
        message_count: usize,
        content_width: u16,
        expanded_ids: &HashSet<String>,
    ) {
        self.message_count = message_count;
        self.content_width = content_width;
        self.cached_expanded_ids = expanded_ids.clone();
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
    }

    /// Indices of messages intersecting the viewport, padded by half a
    /// screen on each side so partial scrolls never pop blocks in late.
    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }

    /// Map a y coordinate on the scroll canvas to a message index.
    pub fn index_at(&self, canvas_y: u16) -> Option<usize> {
        let idx = self.prefix_heights.partition_point(|&end| end <= canvas_y);
        (idx < self.prefix_heights.len()).then_some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Part, Role};

    fn msg(id: &str, role: Role, text: &str) -> Message {
        Message {
            id: id.to_string(),
            role,
            parts: vec![Part::text(text)],
        }
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        let no_expanded = HashSet::new();
        let messages = vec![
            msg("m1", Role::User, "hello"),
            msg("m2", Role::Assistant, "hi"),
            msg("m3", Role::User, "weather?"),
        ];
        cache.heights = vec![3; 3];
        cache.update_metadata(3, 80, &no_expanded);

        // Same everything -> all but the last (volatile recheck) reusable
        assert_eq!(cache.reusable_count(&messages, 80, false, &no_expanded), 2);

        // Width changed -> nothing reusable
        assert_eq!(cache.reusable_count(&messages, 40, false, &no_expanded), 0);

        // Streaming -> last message excluded
        let mut grown = messages.clone();
        grown.push(msg("m4", Role::Assistant, "partial"));
        assert_eq!(cache.reusable_count(&grown, 80, true, &no_expanded), 3);

        // Conversation reset -> nothing reusable
        assert_eq!(
            cache.reusable_count(&messages[..1], 80, false, &no_expanded),
            0
        );
    }

    #[test]
    fn test_expansion_toggle_invalidates_from_toggled_message() {
        let mut cache = LayoutCache::new();
        let no_expanded = HashSet::new();
        let messages = vec![
            msg("m1", Role::User, "one"),
            msg("m2", Role::Assistant, "two"),
            msg("m3", Role::User, "three"),
        ];
        cache.heights = vec![3; 3];
        cache.update_metadata(3, 80, &no_expanded);

        let mut expanded = HashSet::new();
        expanded.insert("m2".to_string());
        // Only m1 is reusable; m2 changed and m3 follows it
        assert_eq!(cache.reusable_count(&messages, 80, false, &expanded), 1);
    }

    #[test]
    fn test_index_at_maps_canvas_rows_to_messages() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![4, 3, 5];
        cache.rebuild_prefix_heights();

        assert_eq!(cache.index_at(0), Some(0));
        assert_eq!(cache.index_at(3), Some(0));
        assert_eq!(cache.index_at(4), Some(1));
        assert_eq!(cache.index_at(6), Some(1));
        assert_eq!(cache.index_at(7), Some(2));
        assert_eq!(cache.index_at(11), Some(2));
        assert_eq!(cache.index_at(12), None);
    }

    #[test]
    fn test_toggle_expanded_round_trips() {
        let mut state = MessageListState::new();
        state.toggle_expanded("m1");
        assert!(state.expanded_ids.contains("m1"));
        state.toggle_expanded("m1");
        assert!(!state.expanded_ids.contains("m1"));
    }

    #[test]
    fn test_scroll_up_detaches_from_bottom() {
        let mut state = MessageListState::new();
        assert!(state.stick_to_bottom);
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn test_scroll_down_repins_at_bottom() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![2, 2];
        state.viewport_height = 10; // viewport taller than content
        state.stick_to_bottom = false;
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_visible_range_windows_content() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 10]; // 100 rows of content
        cache.rebuild_prefix_heights();

        let range = cache.visible_range(0, 20);
        assert_eq!(range.start, 0);
        assert!(range.end < 10, "far-away messages excluded");

        let range = cache.visible_range(80, 20);
        assert!(range.start > 0, "scrolled-past messages excluded");
        assert_eq!(range.end, 10);
    }
}
