//! # TitleBar Component
//!
//! Top status line: which server and meeting questions go to, the current
//! status toast, and a "↓ New" marker when replies arrived below the fold.
//!
//! Stateless. Everything it shows is passed in as props, and the text is
//! clipped to the terminal width so the most important part (the meeting)
//! survives on narrow terminals.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::tui::component::Component;

pub struct TitleBar<'a> {
    pub server: &'a str,
    pub meeting_id: Option<&'a str>,
    pub status_message: &'a str,
    pub has_unseen_content: bool,
}

impl<'a> TitleBar<'a> {
    pub fn text(&self) -> String {
        let meeting = match self.meeting_id {
            Some(id) => format!("meeting {id}"),
            None => "no meeting".to_string(),
        };
        let mut text = format!("Meeting Minutes Chat ({meeting} @ {})", self.server);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(self.status_message);
        }
        if self.has_unseen_content {
            text.push_str(" | ↓ New");
        }
        text
    }
}

/// Cuts `text` to at most `width` terminal columns.
fn clip_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let text = clip_to_width(&self.text(), area.width as usize);
        let style = if self.status_message.is_empty() {
            Style::default()
        } else {
            Style::default().fg(Color::Yellow)
        };
        frame.render_widget(Span::styled(text, style), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_string(title_bar: &mut TitleBar, width: u16) -> String {
        let backend = TestBackend::new(width, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_shows_meeting_and_server() {
        let mut title_bar = TitleBar {
            server: "http://localhost:5000",
            meeting_id: Some("12"),
            status_message: "",
            has_unseen_content: false,
        };
        let text = render_to_string(&mut title_bar, 80);
        assert!(text.contains("meeting 12"));
        assert!(text.contains("http://localhost:5000"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_title_without_meeting() {
        let title_bar = TitleBar {
            server: "s",
            meeting_id: None,
            status_message: "",
            has_unseen_content: false,
        };
        assert_eq!(title_bar.text(), "Meeting Minutes Chat (no meeting @ s)");
    }

    #[test]
    fn test_title_with_status_and_unseen_content() {
        let mut title_bar = TitleBar {
            server: "s",
            meeting_id: Some("3"),
            status_message: "Waiting for the previous answer...",
            has_unseen_content: true,
        };
        let text = render_to_string(&mut title_bar, 100);
        assert!(text.contains("Waiting for the previous answer..."));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_clip_to_width() {
        assert_eq!(clip_to_width("abcdef", 3), "abc");
        assert_eq!(clip_to_width("ab", 10), "ab");
        // Wide characters take two columns
        assert_eq!(clip_to_width("会議録", 5), "会議");
    }
}
