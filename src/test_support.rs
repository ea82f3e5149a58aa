//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::backend::{BackendError, ChatBackend, ChatRequest, ChatResponse};
use crate::core::message::{ChatMessage, Role};
use crate::core::session::ChatSession;
use crate::core::view::{MemoryTranscript, PlaceholderId, TranscriptView};

pub fn answer(text: &str) -> ChatResponse {
    ChatResponse::with_answer(text)
}

/// A backend that plays back canned replies in order and records requests.
pub struct StaticBackend {
    replies: Mutex<VecDeque<Result<ChatResponse, BackendError>>>,
    calls: Arc<Mutex<Vec<ChatRequest>>>,
}

impl StaticBackend {
    pub fn sequence(replies: Vec<Result<ChatResponse, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(reply: Result<ChatResponse, BackendError>) -> Self {
        Self::sequence(vec![reply])
    }

    pub fn answering(text: &str) -> Self {
        Self::replying(Ok(answer(text)))
    }

    /// Shared handle to the requests received so far.
    pub fn calls(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl ChatBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        self.calls.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Network("no more canned replies".to_string())))
    }
}

/// A backend that holds its single reply until the test releases it.
pub struct GatedBackend {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    reply: Mutex<Option<Result<ChatResponse, BackendError>>>,
}

impl GatedBackend {
    pub fn new(reply: Result<ChatResponse, BackendError>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let backend = Self {
            gate: Mutex::new(Some(rx)),
            reply: Mutex::new(Some(reply)),
        };
        (backend, tx)
    }
}

#[async_trait]
impl ChatBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn ask(&self, _request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(BackendError::Network("reply already taken".to_string())))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Appended(Role, String),
    Inserted(PlaceholderId),
    Removed(PlaceholderId),
}

/// A view that records every call in order (scrolls excluded).
#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl TranscriptView for RecordingView {
    fn append(&self, message: &ChatMessage) {
        self.events
            .lock()
            .unwrap()
            .push(ViewEvent::Appended(message.role, message.text.clone()));
    }

    fn insert_placeholder(&self, id: &PlaceholderId) {
        self.events.lock().unwrap().push(ViewEvent::Inserted(id.clone()));
    }

    fn remove_placeholder(&self, id: &PlaceholderId) {
        self.events.lock().unwrap().push(ViewEvent::Removed(id.clone()));
    }
}

/// Creates a session over `backend` rendering into a fresh in-memory view.
pub fn session_with(backend: impl ChatBackend + 'static) -> (ChatSession, Arc<MemoryTranscript>) {
    let view = Arc::new(MemoryTranscript::new());
    let session = ChatSession::new(Arc::new(backend), view.clone());
    (session, view)
}
