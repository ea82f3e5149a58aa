use std::fmt;

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse};

/// Errors that can occur while talking to the meeting-minutes server.
#[derive(Debug)]
pub enum BackendError {
    /// Backend misconfigured (bad base URL, client could not be built).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Server answered with a non-success status.
    Api { status: u16, message: String },
    /// Body could not be parsed as the expected JSON.
    Parse(String),
    /// Server accepted the request but refused it (redirected back to the form).
    Rejected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::Rejected(msg) => write!(f, "rejected by server: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The chat endpoint a `ChatSession` sends questions to.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable name of the backend (shown in the title bar).
    fn name(&self) -> &str;

    /// Sends one question and returns the parsed reply.
    ///
    /// Any non-2xx status or malformed body is an error.
    async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Api {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 404): Not Found");
        assert_eq!(
            BackendError::Network("refused".to_string()).to_string(),
            "network error: refused"
        );
        assert_eq!(
            BackendError::Parse("eof".to_string()).to_string(),
            "parse error: eof"
        );
    }
}
