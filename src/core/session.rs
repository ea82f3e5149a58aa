//! # Chat Session
//!
//! One question/answer exchange with the meeting-minutes server, driven
//! through injected collaborators:
//!
//! ```text
//!   Idle ──begin()──► Sending ──complete()──► Rendered  (answer or fallback)
//!                                        └──► Failed    (error string)
//! ```
//!
//! `begin()` does the synchronous part (optimistic user message, clear input,
//! placeholder) and hands back an owned [`PendingExchange`]. `complete()` does
//! the network part and renders exactly one terminal bot message, after
//! removing the placeholder. Failures are logged and rendered, never returned.
//!
//! [`ChatSession::submit`] chains both for callers that can just await.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, ERROR_ANSWER, FALLBACK_ANSWER};
use super::view::{InputControl, PlaceholderId, TranscriptView};
use crate::backend::{ChatBackend, ChatRequest};

/// What happens when a question is submitted while another is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InFlightPolicy {
    /// Every submission is independent. Replies land in completion order.
    Overlap,
    /// Only one exchange at a time; extra submissions are turned away.
    #[default]
    #[serde(rename = "single")]
    SingleFlight,
}

/// How an exchange ended. Each variant carries the bot message it rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    Answered(ChatMessage),
    Fallback(ChatMessage),
    Failed(ChatMessage),
}

impl Exchange {
    pub fn message(&self) -> &ChatMessage {
        match self {
            Exchange::Answered(msg) | Exchange::Fallback(msg) | Exchange::Failed(msg) => msg,
        }
    }
}

/// Result of the synchronous half of a submission.
pub enum Begin {
    /// Input was empty or whitespace. Nothing was touched.
    Ignored,
    /// Another exchange is in flight under `SingleFlight`. Nothing was touched.
    Busy,
    Started(PendingExchange),
}

/// Result of a full submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Ignored,
    Busy,
    Completed(Exchange),
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    view: Arc<dyn TranscriptView>,
    meeting_id: Option<String>,
    policy: InFlightPolicy,
    busy: Arc<AtomicBool>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, view: Arc<dyn TranscriptView>) -> Self {
        Self {
            backend,
            view,
            meeting_id: None,
            policy: InFlightPolicy::default(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the meeting every question is asked about. `None` sends `null`.
    pub fn with_meeting(mut self, meeting_id: Option<String>) -> Self {
        self.meeting_id = meeting_id;
        self
    }

    pub fn with_policy(mut self, policy: InFlightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn meeting_id(&self) -> Option<&str> {
        self.meeting_id.as_deref()
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// True while a `SingleFlight` exchange is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Reads the question, renders it, and prepares the request.
    ///
    /// Order of effects: user message, clear input, placeholder.
    pub fn begin(&self, input: &mut dyn InputControl) -> Begin {
        let raw = input.text();
        let question = raw.trim();
        if question.is_empty() {
            debug!("Ignoring empty submission");
            return Begin::Ignored;
        }

        let guard = match self.policy {
            InFlightPolicy::Overlap => BusyGuard(None),
            InFlightPolicy::SingleFlight => {
                if self
                    .busy
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    info!("Submission turned away: an answer is still pending");
                    return Begin::Busy;
                }
                BusyGuard(Some(self.busy.clone()))
            }
        };

        self.view.append(&ChatMessage::user(question));
        self.view.scroll_to_bottom();
        input.clear();

        let placeholder = PlaceholderId::new();
        self.view.insert_placeholder(&placeholder);
        self.view.scroll_to_bottom();

        let request = ChatRequest::new(self.meeting_id.clone(), question);
        debug!(
            "Exchange started: placeholder={}, question_len={}",
            placeholder,
            request.question.len()
        );

        Begin::Started(PendingExchange {
            backend: self.backend.clone(),
            view: self.view.clone(),
            request,
            placeholder,
            _guard: guard,
        })
    }

    /// Runs a whole exchange. Never fails: errors become a rendered message.
    pub async fn submit(&self, input: &mut dyn InputControl) -> Submission {
        match self.begin(input) {
            Begin::Ignored => Submission::Ignored,
            Begin::Busy => Submission::Busy,
            Begin::Started(pending) => Submission::Completed(pending.complete().await),
        }
    }
}

/// An exchange whose request has not been sent yet.
///
/// Owns everything it needs, so it can be moved onto a spawned task.
pub struct PendingExchange {
    backend: Arc<dyn ChatBackend>,
    view: Arc<dyn TranscriptView>,
    request: ChatRequest,
    placeholder: PlaceholderId,
    _guard: BusyGuard,
}

impl PendingExchange {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    pub fn placeholder(&self) -> &PlaceholderId {
        &self.placeholder
    }

    /// Sends the request and renders the single terminal message.
    pub async fn complete(self) -> Exchange {
        let result = self.backend.ask(&self.request).await;

        self.view.remove_placeholder(&self.placeholder);

        let exchange = match result {
            Ok(response) => match response.answer_text() {
                Some(answer) => Exchange::Answered(ChatMessage::bot(answer)),
                None => {
                    info!("Server reply had no answer, showing fallback");
                    Exchange::Fallback(ChatMessage::bot(FALLBACK_ANSWER))
                }
            },
            Err(e) => {
                warn!("Chat error: {}", e);
                Exchange::Failed(ChatMessage::bot(ERROR_ANSWER))
            }
        };

        self.view.append(exchange.message());
        self.view.scroll_to_bottom();
        debug!("Exchange finished: placeholder={}", self.placeholder);
        exchange
    }
}

/// Clears the single-flight flag when the exchange ends or is dropped.
struct BusyGuard(Option<Arc<AtomicBool>>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if let Some(flag) = &self.0 {
            flag.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ChatResponse};
    use crate::core::message::Role;
    use crate::core::view::{MemoryTranscript, TranscriptEntry};
    use crate::test_support::{
        GatedBackend, RecordingView, StaticBackend, ViewEvent, answer, session_with,
    };

    #[tokio::test]
    async fn test_answer_is_rendered() {
        let (session, view) = session_with(StaticBackend::answering("42"));
        let mut input = "What is the answer?".to_string();

        let outcome = session.submit(&mut input).await;

        assert!(matches!(outcome, Submission::Completed(Exchange::Answered(_))));
        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "What is the answer?");
        assert_eq!(messages[1].role, Role::Bot);
        assert_eq!(messages[1].text, "42");
        assert_eq!(view.placeholder_count(), 0);
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn test_question_is_trimmed() {
        let (session, view) = session_with(StaticBackend::answering("ok"));
        let mut input = "   spaced out \n".to_string();

        session.submit(&mut input).await;

        assert_eq!(view.messages()[0].text, "spaced out");
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_input_is_ignored() {
        let backend = StaticBackend::answering("never");
        let calls = backend.calls();
        let (session, view) = session_with(backend);

        for raw in ["", "   ", "\n\t "] {
            let mut input = raw.to_string();
            let outcome = session.submit(&mut input).await;
            assert_eq!(outcome, Submission::Ignored);
            assert_eq!(input, raw, "ignored input must be left alone");
        }

        assert!(view.entries().is_empty());
        assert_eq!(view.scroll_count(), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_answer_renders_fallback() {
        let (session, view) = session_with(StaticBackend::replying(Ok(ChatResponse::default())));
        let mut input = "anything?".to_string();

        let outcome = session.submit(&mut input).await;

        assert!(matches!(outcome, Submission::Completed(Exchange::Fallback(_))));
        assert_eq!(view.messages()[1].text, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_empty_answer_renders_fallback() {
        let (session, view) = session_with(StaticBackend::answering(""));
        let mut input = "anything?".to_string();

        session.submit(&mut input).await;

        assert_eq!(view.messages()[1].text, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_network_failure_renders_error_and_removes_placeholder() {
        let (session, view) = session_with(StaticBackend::replying(Err(BackendError::Network(
            "connection refused".to_string(),
        ))));
        let mut input = "hello?".to_string();

        let outcome = session.submit(&mut input).await;

        assert!(matches!(outcome, Submission::Completed(Exchange::Failed(_))));
        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Bot);
        assert_eq!(messages[1].text, ERROR_ANSWER);
        assert_eq!(view.placeholder_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_renders_error() {
        let (session, view) = session_with(StaticBackend::replying(Err(BackendError::Parse(
            "expected value".to_string(),
        ))));
        let mut input = "hello?".to_string();

        session.submit(&mut input).await;

        assert_eq!(view.messages()[1].text, ERROR_ANSWER);
    }

    #[tokio::test]
    async fn test_session_stays_usable_after_failure() {
        let backend = StaticBackend::sequence(vec![
            Err(BackendError::Network("down".to_string())),
            Ok(answer("back up")),
        ]);
        let (session, view) = session_with(backend);

        let mut first = "one".to_string();
        session.submit(&mut first).await;
        let mut second = "two".to_string();
        session.submit(&mut second).await;

        let texts: Vec<_> = view.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["one", ERROR_ANSWER, "two", "back up"]);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_effect_order_placeholder_removed_before_terminal_message() {
        let view = Arc::new(RecordingView::default());
        let session = ChatSession::new(Arc::new(StaticBackend::answering("done")), view.clone());
        let mut input = "order?".to_string();

        session.submit(&mut input).await;

        let events = view.events();
        let placeholder = match &events[1] {
            ViewEvent::Inserted(id) => id.clone(),
            other => panic!("expected placeholder second, got {:?}", other),
        };
        assert_eq!(
            events,
            vec![
                ViewEvent::Appended(Role::User, "order?".to_string()),
                ViewEvent::Inserted(placeholder.clone()),
                ViewEvent::Removed(placeholder),
                ViewEvent::Appended(Role::Bot, "done".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_request_carries_meeting_and_question() {
        let backend = StaticBackend::answering("ok");
        let calls = backend.calls();
        let (session, _view) = session_with(backend);
        let session = session.with_meeting(Some("12".to_string()));
        let mut input = " Who attended? ".to_string();

        session.submit(&mut input).await;

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![ChatRequest::new(Some("12".to_string()), "Who attended?")]
        );
    }

    #[tokio::test]
    async fn test_optimistic_render_before_reply() {
        let (backend, release) = GatedBackend::new(Ok(answer("later")));
        let (session, view) = session_with(backend);
        let mut input = "pending?".to_string();

        let pending = match session.begin(&mut input) {
            Begin::Started(p) => p,
            _ => panic!("expected exchange to start"),
        };

        // User message and placeholder are visible, input cleared, no reply yet
        assert!(input.is_empty());
        let entries = view.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[0], TranscriptEntry::Message(m) if m.text == "pending?"));
        assert_eq!(
            entries[1],
            TranscriptEntry::Placeholder(pending.placeholder().clone())
        );

        let task = tokio::spawn(pending.complete());
        release.send(()).unwrap();
        let exchange = task.await.unwrap();

        assert_eq!(exchange.message().text, "later");
        assert_eq!(view.placeholder_count(), 0);
    }

    #[tokio::test]
    async fn test_single_flight_turns_away_second_submission() {
        let (backend, release) = GatedBackend::new(Ok(answer("first")));
        let (session, view) = session_with(backend);

        let mut first = "first?".to_string();
        let pending = match session.begin(&mut first) {
            Begin::Started(p) => p,
            _ => panic!("expected exchange to start"),
        };
        assert!(session.is_busy());

        let mut second = "second?".to_string();
        assert!(matches!(session.begin(&mut second), Begin::Busy));
        assert_eq!(second, "second?", "busy submission keeps its text");
        assert_eq!(view.messages().len(), 1);

        let task = tokio::spawn(pending.complete());
        release.send(()).unwrap();
        task.await.unwrap();

        assert!(!session.is_busy());
        assert!(matches!(session.begin(&mut second), Begin::Started(_)));
    }

    #[tokio::test]
    async fn test_dropping_pending_exchange_releases_busy_flag() {
        let (session, _view) = session_with(StaticBackend::answering("x"));
        let mut input = "dropped".to_string();

        let begin = session.begin(&mut input);
        assert!(session.is_busy());
        drop(begin);

        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_overlap_appends_in_completion_order() {
        let (slow, release_slow) = GatedBackend::new(Ok(answer("slow")));
        let view = Arc::new(MemoryTranscript::new());
        let session = ChatSession::new(Arc::new(slow), view.clone())
            .with_policy(InFlightPolicy::Overlap);

        let mut first = "first".to_string();
        let slow_pending = match session.begin(&mut first) {
            Begin::Started(p) => p,
            _ => panic!("expected exchange to start"),
        };

        let fast_session = ChatSession::new(Arc::new(StaticBackend::answering("fast")), view.clone())
            .with_policy(InFlightPolicy::Overlap);
        let mut second = "second".to_string();
        let fast_pending = match fast_session.begin(&mut second) {
            Begin::Started(p) => p,
            _ => panic!("overlap must not turn submissions away"),
        };
        assert_eq!(view.placeholder_count(), 2);

        let slow_task = tokio::spawn(slow_pending.complete());
        fast_pending.complete().await;
        release_slow.send(()).unwrap();
        slow_task.await.unwrap();

        let texts: Vec<_> = view.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["first", "second", "fast", "slow"]);
        assert_eq!(view.placeholder_count(), 0);
    }

    #[test]
    fn test_policy_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            in_flight: InFlightPolicy,
        }
        let single: Wrapper = toml::from_str(r#"in_flight = "single""#).unwrap();
        assert_eq!(single.in_flight, InFlightPolicy::SingleFlight);
        let overlap: Wrapper = toml::from_str(r#"in_flight = "overlap""#).unwrap();
        assert_eq!(overlap.in_flight, InFlightPolicy::Overlap);
    }
}
