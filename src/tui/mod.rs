//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//! The intention is to swap this out for a different adapter in the
//! future if needed.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//! it sleeps up to 250ms waiting for input, and only redraws when an
//! event arrived or a background action mutated the state. Streaming
//! responses arrive as actions on a channel, so each batch of deltas
//! produces exactly one redraw.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor
//! because ratatui's `set_cursor_position` resets the terminal's blink
//! timer on every `draw()` call, making blinking cursors appear erratic
//! during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::chat::{ChatBackend, ChatRequest, DataStreamBackend, StreamEvent};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    /// Suggested first prompt shown on the empty-state card
    pub suggestion: String,
}

impl TuiState {
    pub fn new(suggestion: String) -> Self {
        let mut input_box = InputBox::new();
        input_box.placeholder = suggestion.clone();
        Self {
            message_list: MessageListState::new(),
            input_box,
            suggestion,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(DataStreamBackend::new(config.backend_url.clone()));
    let mut app = App::new(backend);
    let mut tui = TuiState::new(config.placeholder.clone());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background streaming tasks
    let (tx, rx) = mpsc::channel();

    let mut needs_redraw = true; // Force first frame

    loop {
        // Sync InputBox props with App state: typing is only possible
        // while no request is in flight.
        tui.input_box.enabled = app.status.is_ready();
        tui.input_box.status_label = app.status.label();

        // Only draw when something changed
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(std::time::Duration::from_millis(250));

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            // Resize just needs a redraw (already flagged above)
            if matches!(event, TuiEvent::Resize) {
                continue;
            }

            // Esc / Ctrl+C quit
            if matches!(event, TuiEvent::Quit | TuiEvent::ForceQuit) {
                if update(&mut app, Action::Quit) == Effect::Quit {
                    should_quit = true;
                }
                continue;
            }

            // Mouse hover tracks which message block the cursor is over
            if let TuiEvent::MouseMove(_col, row) = event {
                let frame_area = terminal.get_frame().area();
                let scroll_offset = tui.message_list.scroll_state.offset().y;
                tui.message_list.hovered_index = ui::hit_test_message(
                    row,
                    frame_area,
                    scroll_offset,
                    &tui.message_list.layout.prefix_heights,
                );
                continue;
            }

            // Mouse click toggles the raw-JSON view on the hit message
            if let TuiEvent::MouseClick(_col, row) = event {
                let frame_area = terminal.get_frame().area();
                let scroll_offset = tui.message_list.scroll_state.offset().y;
                let hit = ui::hit_test_message(
                    row,
                    frame_area,
                    scroll_offset,
                    &tui.message_list.layout.prefix_heights,
                );
                if let Some(idx) = hit {
                    tui.message_list.hovered_index = Some(idx);
                    if let Some(message) = app.conversation.messages.get(idx) {
                        let id = message.id.clone();
                        tui.message_list.toggle_expanded(&id);
                    }
                }
                continue;
            }

            // Scroll events always go to MessageList
            if matches!(
                event,
                TuiEvent::ScrollUp
                    | TuiEvent::ScrollDown
                    | TuiEvent::ScrollPageUp
                    | TuiEvent::ScrollPageDown
            ) {
                tui.message_list.handle_event(&event);
                continue;
            }

            // InputBox handles everything else
            if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event)
                && update(&mut app, Action::Submit(text)) == Effect::SpawnRequest
            {
                spawn_request(&app, tx.clone());
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions (streaming responses)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            match update(&mut app, action) {
                Effect::Quit => {
                    should_quit = true;
                    break;
                }
                Effect::SpawnRequest => spawn_request(&app, tx.clone()),
                Effect::None => {}
            }
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

fn spawn_request(app: &App, tx: mpsc::Sender<Action>) {
    info!("Spawning chat request ({} messages)", app.conversation.messages.len());

    // Clone what we need for the async task
    let backend = app.backend.clone();
    let messages = app.conversation.messages.clone();
    let conversation_id = app.conversation_id.clone();

    // Async channel for stream events
    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel::<StreamEvent>(100);

    // Spawn the backend streaming task
    let tx_stream = tx.clone();
    tokio::spawn(async move {
        let request = ChatRequest {
            conversation_id: &conversation_id,
            messages: &messages,
        };
        if let Err(e) = backend.stream_chat(request, event_tx).await
            && tx_stream.send(Action::StreamFailed(e.to_string())).is_err()
        {
            warn!("Failed to send stream error action: receiver dropped");
        }
    });

    // Spawn a task to forward stream events to the Action channel
    tokio::spawn(async move {
        let mut forwarded_count = 0usize;
        while let Some(event) = event_rx.recv().await {
            forwarded_count += 1;
            let is_finish = matches!(event, StreamEvent::Finish);
            if tx.send(Action::Stream(event)).is_err() {
                warn!("Failed to forward stream event: receiver dropped");
                return;
            }
            if is_finish {
                debug!("Stream finished after {forwarded_count} events");
                return;
            }
        }

        // Fallback: channel closed without a finish event
        info!("Stream channel closed after {forwarded_count} events");
        if tx.send(Action::StreamClosed).is_err() {
            warn!("Failed to send stream-closed action: receiver dropped");
        }
    });
}
