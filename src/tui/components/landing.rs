//! # Landing Page Component
//!
//! Shown in place of the transcript until the first question is asked.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct LandingPage<'a> {
    pub meeting_id: Option<&'a str>,
}

impl<'a> LandingPage<'a> {
    pub fn new(meeting_id: Option<&'a str>) -> Self {
        Self { meeting_id }
    }

    fn hint(&self) -> String {
        match self.meeting_id {
            Some(id) => format!("Ask anything about meeting {id}"),
            None => "Ask anything about your meetings".to_string(),
        }
    }
}

impl<'a> Component for LandingPage<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                self.hint(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("minutes-chat v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let [text_area] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
    }
}
