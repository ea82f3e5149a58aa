//! # Transcript Views
//!
//! The UI collaborators a `ChatSession` drives, expressed as traits so the
//! session never looks anything up on its own:
//!
//! - [`TranscriptView`]: the ordered region messages are appended to. Takes
//!   `&self` so one view can be shared by overlapping exchanges.
//! - [`InputControl`]: where the question comes from, and what gets cleared.
//!
//! Implementations here cover tests ([`MemoryTranscript`]), markup export
//! ([`HtmlTranscript`]) and line-oriented output ([`PlainTranscript`]). The TUI
//! has its own channel-backed view.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use super::message::{ChatMessage, Role, escape_html, strip_controls};

/// Identifies one in-flight reply marker. Unique per dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderId(String);

impl PlaceholderId {
    pub fn new() -> Self {
        Self(format!("loading-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlaceholderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait TranscriptView: Send + Sync {
    /// Appends a message at the end of the transcript.
    fn append(&self, message: &ChatMessage);

    /// Appends a "reply in flight" marker.
    fn insert_placeholder(&self, id: &PlaceholderId);

    /// Removes a marker previously inserted. Unknown ids are ignored.
    fn remove_placeholder(&self, id: &PlaceholderId);

    /// Brings the newest entry into view.
    fn scroll_to_bottom(&self) {}
}

pub trait InputControl {
    /// Current raw contents of the control.
    fn text(&self) -> String;

    fn clear(&mut self);
}

impl InputControl for String {
    fn text(&self) -> String {
        self.clone()
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// MemoryTranscript
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message(ChatMessage),
    Placeholder(PlaceholderId),
}

/// Keeps the transcript in memory, in append order.
#[derive(Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
    scrolls: Mutex<usize>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        lock(&self.entries).clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.entries)
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Message(msg) => Some(msg.clone()),
                TranscriptEntry::Placeholder(_) => None,
            })
            .collect()
    }

    pub fn placeholder_count(&self) -> usize {
        lock(&self.entries)
            .iter()
            .filter(|entry| matches!(entry, TranscriptEntry::Placeholder(_)))
            .count()
    }

    /// How many times the view was asked to scroll to the bottom.
    pub fn scroll_count(&self) -> usize {
        *lock(&self.scrolls)
    }
}

impl TranscriptView for MemoryTranscript {
    fn append(&self, message: &ChatMessage) {
        lock(&self.entries).push(TranscriptEntry::Message(message.clone()));
    }

    fn insert_placeholder(&self, id: &PlaceholderId) {
        lock(&self.entries).push(TranscriptEntry::Placeholder(id.clone()));
    }

    fn remove_placeholder(&self, id: &PlaceholderId) {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|entry| !matches!(entry, TranscriptEntry::Placeholder(p) if p == id));
        if entries.len() == before {
            debug!("Placeholder {} was not in the transcript", id);
        }
    }

    fn scroll_to_bottom(&self) {
        *lock(&self.scrolls) += 1;
    }
}

// ============================================================================
// HtmlTranscript
// ============================================================================

/// Builds the chat box markup of the web front end.
///
/// Every piece of message text is escaped before it is inserted, so a question
/// or answer containing markup shows up as literal text.
#[derive(Default)]
pub struct HtmlTranscript {
    nodes: Mutex<Vec<HtmlNode>>,
}

struct HtmlNode {
    placeholder: Option<PlaceholderId>,
    markup: String,
}

impl HtmlTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transcript as an HTML fragment, one node per line.
    pub fn to_html(&self) -> String {
        lock(&self.nodes)
            .iter()
            .map(|node| node.markup.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn message_markup(message: &ChatMessage) -> String {
    let justify = match message.role {
        Role::User => " justify-content-end",
        Role::Bot => "",
    };
    format!(
        r#"<div class="d-flex{justify} mb-3"><div class="chat-message chat-{role}"><p class="mb-0 small">{text}</p></div></div>"#,
        role = message.role.as_str(),
        text = escape_html(&message.text),
    )
}

fn placeholder_markup(id: &PlaceholderId) -> String {
    format!(
        r#"<div id="{id}" class="d-flex mb-3"><div class="chat-message chat-bot"><div class="spinner-border spinner-border-sm text-light" role="status"><span class="visually-hidden">Loading...</span></div></div></div>"#,
        id = escape_html(id.as_str()),
    )
}

impl TranscriptView for HtmlTranscript {
    fn append(&self, message: &ChatMessage) {
        lock(&self.nodes).push(HtmlNode {
            placeholder: None,
            markup: message_markup(message),
        });
    }

    fn insert_placeholder(&self, id: &PlaceholderId) {
        lock(&self.nodes).push(HtmlNode {
            placeholder: Some(id.clone()),
            markup: placeholder_markup(id),
        });
    }

    fn remove_placeholder(&self, id: &PlaceholderId) {
        lock(&self.nodes).retain(|node| node.placeholder.as_ref() != Some(id));
    }
}

// ============================================================================
// PlainTranscript
// ============================================================================

/// Writes each message as a `speaker: text` line. Placeholders are invisible.
///
/// Control characters are stripped before writing, so server text reaches the
/// terminal as plain characters only.
pub struct PlainTranscript<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> PlainTranscript<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> TranscriptView for PlainTranscript<W> {
    fn append(&self, message: &ChatMessage) {
        let speaker = match message.role {
            Role::User => "you",
            Role::Bot => "minutes",
        };
        let line = format!("{}: {}", speaker, strip_controls(&message.text));
        let mut out = lock(&self.out);
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!("Failed to write transcript line: {}", e);
        }
    }

    fn insert_placeholder(&self, _id: &PlaceholderId) {}

    fn remove_placeholder(&self, _id: &PlaceholderId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_ids_are_unique() {
        let a = PlaceholderId::new();
        let b = PlaceholderId::new();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("loading-"));
    }

    #[test]
    fn test_string_input_control() {
        let mut input = String::from("  hello ");
        assert_eq!(InputControl::text(&input), "  hello ");
        InputControl::clear(&mut input);
        assert!(input.is_empty());
    }

    #[test]
    fn test_memory_transcript_removes_only_matching_placeholder() {
        let view = MemoryTranscript::new();
        let first = PlaceholderId::new();
        let second = PlaceholderId::new();
        view.insert_placeholder(&first);
        view.insert_placeholder(&second);

        view.remove_placeholder(&first);

        assert_eq!(
            view.entries(),
            vec![TranscriptEntry::Placeholder(second.clone())]
        );
        // Removing again is harmless
        view.remove_placeholder(&first);
        assert_eq!(view.placeholder_count(), 1);
    }

    #[test]
    fn test_html_transcript_escapes_markup() {
        let view = HtmlTranscript::new();
        view.append(&ChatMessage::user("<script>alert('x')</script>"));

        let html = view.to_html();
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("justify-content-end"));
        assert!(html.contains("chat-user"));
    }

    #[test]
    fn test_html_transcript_placeholder_lifecycle() {
        let view = HtmlTranscript::new();
        let id = PlaceholderId::new();
        view.insert_placeholder(&id);
        assert!(view.to_html().contains(id.as_str()));
        assert!(view.to_html().contains("spinner-border"));

        view.remove_placeholder(&id);
        view.append(&ChatMessage::bot("42"));

        let html = view.to_html();
        assert!(!html.contains("spinner-border"));
        assert!(html.contains(r#"<p class="mb-0 small">42</p>"#));
        assert!(!html.contains("justify-content-end"));
    }

    #[test]
    fn test_plain_transcript_writes_speaker_lines() {
        let view = PlainTranscript::new(Vec::new());
        view.append(&ChatMessage::user("Who owns the budget?"));
        view.insert_placeholder(&PlaceholderId::new());
        view.append(&ChatMessage::bot("Dana"));

        let written = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(written, "you: Who owns the budget?\nminutes: Dana\n");
    }

    #[test]
    fn test_plain_transcript_strips_terminal_escapes() {
        let view = PlainTranscript::new(Vec::new());
        view.append(&ChatMessage::bot("\x1b]0;pwned\x07\x1b[2Jhi"));

        let written = String::from_utf8(view.into_inner()).unwrap();
        assert!(!written.contains('\x1b'));
        assert!(!written.contains('\x07'));
        assert_eq!(written, "minutes: ]0;pwned[2Jhi\n");
    }
}
