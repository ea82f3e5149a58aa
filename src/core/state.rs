//! # Application State
//!
//! What the interactive front end shows, independent of how it is drawn.
//!
//! ```text
//! App
//! ├── server: String               // backend shown in the title bar
//! ├── meeting_id: Option<String>   // meeting questions are asked about
//! ├── items: Vec<TranscriptItem>   // messages and in-flight placeholders
//! └── status: Option<Toast>        // self-dismissing status line
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::time::{Duration, Instant};

use crate::core::message::ChatMessage;
use crate::core::view::PlaceholderId;

/// How long a status toast stays up.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptItem {
    Message(ChatMessage),
    Pending(PlaceholderId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_TTL
    }
}

pub struct App {
    pub server: String,
    pub meeting_id: Option<String>,
    pub items: Vec<TranscriptItem>,
    pub status: Option<Toast>,
}

impl App {
    pub fn new(server: impl Into<String>, meeting_id: Option<String>) -> Self {
        Self {
            server: server.into(),
            meeting_id,
            items: Vec::new(),
            status: None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, TranscriptItem::Pending(_)))
    }

    pub fn message_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, TranscriptItem::Message(_)))
            .count()
    }

    pub fn notify_at(&mut self, text: impl Into<String>, at: Instant) {
        self.status = Some(Toast {
            text: text.into(),
            shown_at: at,
        });
    }

    /// Drops the toast once it has been up for [`TOAST_TTL`].
    /// Returns true if something was dismissed (caller should redraw).
    pub fn expire_status(&mut self, now: Instant) -> bool {
        if self.status.as_ref().is_some_and(|toast| toast.is_expired(now)) {
            self.status = None;
            return true;
        }
        false
    }

    pub fn status_text(&self) -> &str {
        self.status.as_ref().map(|t| t.text.as_str()).unwrap_or("")
    }
}
