use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`.
///
/// Built fresh for every send and never mutated afterwards. A missing meeting
/// serializes as `null` so the server sees the field either way.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub meeting_id: Option<String>,
    pub question: String,
}

impl ChatRequest {
    pub fn new(meeting_id: Option<String>, question: impl Into<String>) -> Self {
        Self {
            meeting_id,
            question: question.into(),
        }
    }
}

/// Body returned by `POST /api/chat`.
///
/// `answer` is kept as raw JSON. Only a body that is not JSON at all counts as
/// malformed; any value in `answer` is rendered or replaced by the fallback.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<Value>,
}

impl ChatResponse {
    pub fn with_answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(Value::String(text.into())),
        }
    }

    /// The answer as display text, or `None` when it is falsy.
    ///
    /// Falsy follows the web client: missing, `null`, `""`, `false` and `0`.
    /// Strings are returned untouched, whitespace included. Other values are
    /// shown as their JSON text.
    pub fn answer_text(&self) -> Option<String> {
        match self.answer.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Result of a successful transcript submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Id of the meeting the server created from the transcript.
    pub meeting_id: String,
}
