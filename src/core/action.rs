//! # Actions
//!
//! Everything that can happen to the transcript becomes an `Action`.
//! The session appends a message? That's `Action::Append(message)`.
//! A reply is in flight? That's `Action::InsertPlaceholder(id)`.
//!
//! The `update()` function applies an action to the state and returns the
//! side effect the front end should perform. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  Effect
//! ```

use std::time::Instant;

use log::debug;

use crate::core::message::ChatMessage;
use crate::core::state::{App, TranscriptItem};
use crate::core::view::PlaceholderId;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Append(ChatMessage),
    InsertPlaceholder(PlaceholderId),
    RemovePlaceholder(PlaceholderId),
    ScrollToBottom,
    /// Show a status toast.
    Notify(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ScrollToBottom,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Append(message) => {
            app.items.push(TranscriptItem::Message(message));
            Effect::None
        }
        Action::InsertPlaceholder(id) => {
            app.items.push(TranscriptItem::Pending(id));
            Effect::None
        }
        Action::RemovePlaceholder(id) => {
            let before = app.items.len();
            app.items
                .retain(|item| !matches!(item, TranscriptItem::Pending(p) if *p == id));
            if app.items.len() == before {
                debug!("RemovePlaceholder for unknown id {}", id);
            }
            Effect::None
        }
        Action::ScrollToBottom => Effect::ScrollToBottom,
        Action::Notify(text) => {
            app.notify_at(text, Instant::now());
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new("http://localhost:5000", None)
    }

    #[test]
    fn test_append_keeps_order() {
        let mut app = app();
        update(&mut app, Action::Append(ChatMessage::user("q")));
        update(&mut app, Action::Append(ChatMessage::bot("a")));

        let texts: Vec<_> = app
            .items
            .iter()
            .map(|item| match item {
                TranscriptItem::Message(m) => m.text.as_str(),
                TranscriptItem::Pending(_) => "<pending>",
            })
            .collect();
        assert_eq!(texts, vec!["q", "a"]);
    }

    #[test]
    fn test_placeholder_insert_and_remove() {
        let mut app = app();
        let id = PlaceholderId::new();
        update(&mut app, Action::InsertPlaceholder(id.clone()));
        assert!(app.has_pending());

        update(&mut app, Action::RemovePlaceholder(id.clone()));
        assert!(!app.has_pending());

        // A second removal is a no-op
        assert_eq!(update(&mut app, Action::RemovePlaceholder(id)), Effect::None);
        assert!(app.items.is_empty());
    }

    #[test]
    fn test_remove_only_matching_placeholder() {
        let mut app = app();
        let a = PlaceholderId::new();
        let b = PlaceholderId::new();
        update(&mut app, Action::InsertPlaceholder(a.clone()));
        update(&mut app, Action::InsertPlaceholder(b.clone()));

        update(&mut app, Action::RemovePlaceholder(a));

        assert_eq!(app.items, vec![TranscriptItem::Pending(b)]);
    }

    #[test]
    fn test_effects() {
        let mut app = app();
        assert_eq!(update(&mut app, Action::ScrollToBottom), Effect::ScrollToBottom);
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_notify_sets_status() {
        let mut app = app();
        update(&mut app, Action::Notify("Request failed".to_string()));
        assert_eq!(app.status_text(), "Request failed");
    }
}
