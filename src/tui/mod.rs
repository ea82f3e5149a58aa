//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! feeds the chat session from the input box.
//!
//! The session never touches `App` directly. It talks to a
//! [`ChannelTranscript`], whose updates arrive here as `Action`s and are
//! applied by `update()` between frames, so every exchange task can run on
//! tokio while the loop itself stays synchronous.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (a reply is in flight): draws every ~80ms so spinners move.
//! - **Idle**: sleeps up to 500ms, only redraws on events, channel traffic or
//!   an expiring status toast.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod transcript;
mod ui;

use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::backend::ChatBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::session::{Begin, ChatSession, Exchange};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

pub use transcript::ChannelTranscript;

const BUSY_NOTICE: &str = "Waiting for the previous answer...";
const FAILED_NOTICE: &str = "Request failed (details in the log)";

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Hands the input box to the session and, if an exchange started, runs its
/// network half on tokio.
fn submit_question(session: &ChatSession, tui: &mut TuiState, tx: &mpsc::Sender<Action>) {
    match session.begin(&mut tui.input_box) {
        Begin::Ignored => {}
        Begin::Busy => {
            if tx.send(Action::Notify(BUSY_NOTICE.to_string())).is_err() {
                warn!("Failed to send busy notice: receiver dropped");
            }
        }
        Begin::Started(pending) => {
            tui.message_list.scroll_to_bottom();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Exchange::Failed(_) = pending.complete().await
                    && tx.send(Action::Notify(FAILED_NOTICE.to_string())).is_err()
                {
                    warn!("Failed to send failure notice: receiver dropped");
                }
            });
        }
    }
}

/// Applies everything the exchange tasks sent since the last frame.
/// Returns (redraw, quit).
fn drain_actions(app: &mut App, tui: &mut TuiState, rx: &mpsc::Receiver<Action>) -> (bool, bool) {
    let mut redraw = false;
    while let Ok(action) = rx.try_recv() {
        redraw = true;
        debug!("Event loop received: {:?}", action);
        match update(app, action) {
            Effect::ScrollToBottom => tui.message_list.scroll_to_bottom(),
            Effect::Quit => return (true, true),
            Effect::None => {}
        }
    }
    (redraw, false)
}

pub fn run(backend: Arc<dyn ChatBackend>, config: &ResolvedConfig) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let session = ChatSession::new(backend, Arc::new(ChannelTranscript::new(tx.clone())))
        .with_meeting(config.meeting_id.clone())
        .with_policy(config.in_flight);
    info!(
        "Starting chat against {} (meeting {:?}, policy {:?})",
        session.backend_name(),
        session.meeting_id(),
        session.policy()
    );

    let mut app = App::new(config.base_url.clone(), config.meeting_id.clone());
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()?;

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.has_pending();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Short timeout while spinners run (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout)?;

        // Process the first event and drain everything pending before the next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        let pending_events = std::iter::from_fn(|| poll_event_immediate().ok().flatten());
        for event in first_event.into_iter().chain(pending_events) {
            match event {
                TuiEvent::Resize => {}
                TuiEvent::Quit => {
                    if update(&mut app, Action::Quit) == Effect::Quit {
                        should_quit = true;
                    }
                }
                TuiEvent::MouseMove(_col, row) => {
                    let frame_area = terminal.get_frame().area();
                    tui.message_list.hovered_index = ui::hit_test_message(row, frame_area, &tui);
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown
                | TuiEvent::ScrollToBottom => {
                    tui.message_list.handle_event(&event);
                }
                _ => {
                    if let Some(InputEvent::Submit) = tui.input_box.handle_event(&event) {
                        submit_question(&session, &mut tui, &tx);
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        let (redraw, quit) = drain_actions(&mut app, &mut tui, &rx);
        if quit {
            break;
        }
        if redraw {
            needs_redraw = true;
        }

        if app.expire_status(Instant::now()) {
            needs_redraw = true;
        }
    }

    if session.is_busy() || app.has_pending() {
        info!("Quitting with a reply still in flight");
    }

    ratatui::restore();
    Ok(())
}
