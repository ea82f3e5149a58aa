//! # Chat Messages
//!
//! A `ChatMessage` is one rendered line of the transcript: who said it, what
//! they said, and when it was rendered. Messages live only as long as the view
//! holding them. Nothing here is persisted.
//!
//! Text is always stored raw. Views that produce markup must pass it through
//! [`escape_html`] first, and views that write to a terminal through
//! [`strip_controls`].

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Shown when the server answered but gave no usable `answer`.
pub const FALLBACK_ANSWER: &str = "I couldn't process that request.";

/// Shown when the request failed (network, HTTP status, or bad JSON).
pub const ERROR_ANSWER: &str = "An error occurred. Please try again.";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    /// CSS-style suffix used by markup views (`chat-user`, `chat-bot`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub rendered_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            rendered_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }
}

/// Escapes the five HTML-significant characters so `text` renders literally.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Drops control characters except tab, newline and carriage return, so
/// `text` cannot drive the terminal it is printed to (ESC, BEL, C1 and DEL).
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_escape_rules {
        ($($name:ident: $input:expr => $expected:expr,)+) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(escape_html($input), $expected);
                }
            )+
        };
    }

    test_escape_rules! {
        test_escape_script_tag: "<script>alert(1)</script>" => "&lt;script&gt;alert(1)&lt;/script&gt;",
        test_escape_ampersand_first: "&lt;" => "&amp;lt;",
        test_escape_quotes: r#"say "hi" it's"# => "say &quot;hi&quot; it&#39;s",
        test_escape_plain_text_untouched: "Budget approved for Q3" => "Budget approved for Q3",
        test_escape_multibyte_untouched: "café ✓" => "café ✓",
    }

    macro_rules! test_control_rules {
        ($($name:ident: $input:expr => $expected:expr,)+) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(strip_controls($input), $expected);
                }
            )+
        };
    }

    test_control_rules! {
        test_strip_osc_title_and_clear_screen: "\x1b]0;pwned\x07\x1b[2Jhi" => "]0;pwned[2Jhi",
        test_strip_c1_and_del: "a\u{9b}31mb\x7f" => "a31mb",
        test_strip_keeps_layout_whitespace: "one\ttwo\r\nthree" => "one\ttwo\r\nthree",
        test_strip_plain_text_untouched: "café ✓" => "café ✓",
    }

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(ChatMessage::user("q").role, Role::User);
        assert_eq!(ChatMessage::bot("a").role, Role::Bot);
        assert_eq!(ChatMessage::bot("a").text, "a");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Bot).unwrap(), r#""bot""#);
        assert_eq!(Role::User.as_str(), "user");
    }
}
