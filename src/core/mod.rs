//! # Core Application Logic
//!
//! Everything the chat client knows about meetings, questions and answers.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • ChatSession          │
//!                    │  • TranscriptView trait │
//!                    │  • State / Action       │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    CLI     │      │  Backend   │
//!     │  Adapter   │      │  (ask etc) │      │  (reqwest) │
//!     │ (ratatui)  │      │            │      │            │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`]: one question/answer exchange and its in-flight policy
//! - [`view`]: the transcript and input collaborators a session drives
//! - [`message`]: `ChatMessage`, fixed reply strings, HTML escaping
//! - [`state`] / [`action`]: front-end state and its reducer
//! - [`config`]: layered settings
//! - [`upload`]: transcript form validation

pub mod action;
pub mod config;
pub mod message;
pub mod session;
pub mod state;
pub mod upload;
pub mod view;

pub use session::{ChatSession, Exchange, InFlightPolicy, Submission};
