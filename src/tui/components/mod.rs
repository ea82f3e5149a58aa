//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: server, meeting and status line
//! - `Message`: one chat bubble or in-flight spinner
//! - `LandingPage`: hint shown while the transcript is empty
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: single-line question field, also the session's input control
//! - `MessageList`: scrollable transcript with layout caching
//!
//! Components receive external data as props rather than reading `App`
//! directly, which keeps each of them testable against a `TestBackend`.

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod landing;
pub mod message;
pub mod message_list;

pub use input_box::{INPUT_HEIGHT, InputBox, InputEvent};
pub use landing::LandingPage;
pub use message_list::{MessageList, MessageListState};
