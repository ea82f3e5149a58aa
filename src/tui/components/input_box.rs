//! # InputBox Component
//!
//! Single-line question field at the bottom of the screen.
//!
//! The buffer is internal state, but the box does not hand it over on Enter:
//! it reports `InputEvent::Submit` and the event loop passes the box itself to
//! the chat session as its [`InputControl`], which reads and clears it.
//! Pasted newlines become spaces since questions are sent as one line.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::view::InputControl;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Offset from area edge to content (border width)
const BORDER_OFFSET: u16 = 1;
/// Left + right borders
const HORIZONTAL_OVERHEAD: u16 = 2;
/// Bordered single line: top border + text + bottom border
pub const INPUT_HEIGHT: u16 = 3;

const PROMPT_TITLE: &str = "Ask about the meeting (Enter to send, Esc to quit)";

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter was pressed; the text is still in the box.
    Submit,
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// Display columns scrolled off the left edge
    scroll: u16,
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
            cursor: 0,
            scroll: 0,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn insert_str(&mut self, text: &str) {
        let flattened: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        self.buffer.insert_str(self.cursor, &flattened);
        self.cursor += flattened.len();
    }

    fn cursor_column(&self) -> u16 {
        self.buffer[..self.cursor].width() as u16
    }

    /// Keeps the cursor inside the visible window of `inner_width` columns.
    fn update_scroll(&mut self, inner_width: u16) {
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if inner_width > 0 && column >= self.scroll + inner_width {
            self.scroll = column + 1 - inner_width;
        }
    }

    /// The slice of the buffer that starts at the scroll offset.
    fn visible_text(&self) -> &str {
        let mut skipped = 0u16;
        for (i, c) in self.buffer.char_indices() {
            if skipped >= self.scroll {
                return &self.buffer[i..];
            }
            skipped += c.width().unwrap_or(0) as u16;
        }
        ""
    }
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

impl InputControl for InputBox {
    fn text(&self) -> String {
        self.buffer.clone()
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        self.update_scroll(inner_width);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(PROMPT_TITLE);
        let input = Paragraph::new(self.visible_text())
            .block(block)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(input, area);

        let cursor_x = area.x + BORDER_OFFSET + self.cursor_column().saturating_sub(self.scroll);
        frame.set_cursor_position((cursor_x, area.y + BORDER_OFFSET));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::ClearInput => (!self.buffer.is_empty()).then(|| {
                InputControl::clear(self);
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => Some(InputEvent::Submit),
            _ => None,
        }
    }
}
