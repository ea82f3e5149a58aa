use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{Role, strip_controls};
use crate::core::state::TranscriptItem;
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// One transcript entry: a chat bubble, or a spinner for a reply in flight.
///
/// Transient: built fresh each frame by `MessageList`. Text is handed to
/// `Paragraph` as-is, so markup in a question or answer shows up literally.
/// Control characters are dropped first.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub item: &'a TranscriptItem,
    pub is_hovered: bool,
    pub spinner_frame: usize,
}

impl<'a> Message<'a> {
    pub fn new(item: &'a TranscriptItem, is_hovered: bool, spinner_frame: usize) -> Self {
        Self {
            item,
            is_hovered,
            spinner_frame,
        }
    }

    /// Height of the bubble at `width`, computed with the same wrapping rules
    /// `Paragraph` uses so the scroll view can be sized before rendering.
    pub fn calculate_height(item: &TranscriptItem, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = match item {
            TranscriptItem::Pending(_) => return 1 + VERTICAL_OVERHEAD,
            TranscriptItem::Message(msg) => strip_controls(msg.text.trim()),
        };
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines = textwrap::wrap(&content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }
}

pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Bot => Style::default().fg(Color::Blue),
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Bot => "minutes",
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let (role, title, content, alignment, content_style) = match self.item {
            TranscriptItem::Message(msg) => {
                let alignment = match msg.role {
                    Role::User => Alignment::Right,
                    Role::Bot => Alignment::Left,
                };
                let title = format!("{} · {}", role_label(msg.role), msg.rendered_at.format("%H:%M"));
                (msg.role, title, strip_controls(msg.text.trim()), alignment, role_style(msg.role))
            }
            TranscriptItem::Pending(_) => {
                let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
                (
                    Role::Bot,
                    role_label(Role::Bot).to_string(),
                    format!("{frame} Loading..."),
                    Alignment::Left,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )
            }
        };

        // Hover brightens the border, otherwise it stays dim
        let border_style = if self.is_hovered {
            role_style(role).add_modifier(Modifier::BOLD)
        } else {
            role_style(role).add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(title)
            .title_alignment(alignment)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(content)
            .style(content_style)
            .alignment(alignment)
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
